//! Job state and the registry that owns it
//!
//! Every job lives in one synchronized map. Callers read snapshots and mutate
//! through [`JobRegistry::update`]; nothing else holds a live reference.

use crate::contact::{Contact, CrawlStatus};
use crate::output::DeliveryReport;
use crate::session::{SessionEvent, SessionReport, SiteSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

pub type JobId = Uuid;

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Running,
    Ok,
    NotFound,
    Restricted,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Ok => "OK",
            Self::NotFound => "NOT_FOUND",
            Self::Restricted => "RESTRICTED",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CrawlStatus> for JobStatus {
    fn from(status: CrawlStatus) -> Self {
        match status {
            CrawlStatus::Ok => Self::Ok,
            CrawlStatus::NotFound => Self::NotFound,
            CrawlStatus::Restricted => Self::Restricted,
        }
    }
}

/// One harvesting job over one or more sites
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: JobId,
    pub urls: Vec<String>,
    pub status: JobStatus,
    pub finished: bool,

    /// Progress is measured in pages: `urls × max_pages` steps in total
    pub total_steps: u32,
    pub current_step: u32,
    pub label: String,
    pub current_url: Option<String>,

    /// 1-based index of the site being crawled
    pub current_url_index: usize,

    pub visited_pages: u32,
    pub explored_links: u32,
    pub errors: Vec<String>,
    pub error_message: Option<String>,
    pub notes: Vec<String>,
    pub sites: Vec<SiteSummary>,
    pub export_path: Option<PathBuf>,
    pub webhook: Option<DeliveryReport>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    contacts: Vec<Contact>,
    #[serde(skip)]
    max_pages: u32,
    #[serde(skip)]
    site_pages: u32,
    #[serde(skip)]
    visited_before_site: u32,
}

impl Job {
    pub fn new(urls: Vec<String>, max_pages: u32) -> Self {
        let total_steps = (urls.len() as u32).saturating_mul(max_pages).max(1);
        Self {
            id: Uuid::new_v4(),
            urls,
            status: JobStatus::Pending,
            finished: false,
            total_steps,
            current_step: 0,
            label: String::new(),
            current_url: None,
            current_url_index: 0,
            visited_pages: 0,
            explored_links: 0,
            errors: Vec::new(),
            error_message: None,
            notes: Vec::new(),
            sites: Vec::new(),
            export_path: None,
            webhook: None,
            started_at: Utc::now(),
            completed_at: None,
            contacts: Vec::new(),
            max_pages,
            site_pages: 0,
            visited_before_site: 0,
        }
    }

    /// Fraction of work done, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        if self.finished {
            return 1.0;
        }
        (f64::from(self.current_step) / f64::from(self.total_steps)).clamp(0.0, 1.0)
    }

    pub fn progress_percent(&self) -> u8 {
        (self.progress() * 100.0).round().clamp(0.0, 100.0) as u8
    }

    /// Contacts of a finished, successful job; empty otherwise
    pub fn contacts(&self) -> &[Contact] {
        if self.finished && self.status != JobStatus::Error {
            &self.contacts
        } else {
            &[]
        }
    }

    pub fn contacts_count(&self) -> usize {
        self.contacts.len()
    }

    /// Applies a session progress event
    pub fn record(&mut self, event: SessionEvent<'_>) {
        match event {
            SessionEvent::SiteStarted { index, total, url } => {
                self.status = JobStatus::Running;
                self.site_pages = 0;
                self.visited_before_site = self.visited_pages;
                self.current_step = self.site_offset(index);
                self.label = format!("Starting site {}/{}", index + 1, total);
                self.current_url = Some(url.to_string());
                self.current_url_index = index + 1;
            }
            SessionEvent::Page {
                index,
                total,
                label,
            } => {
                self.site_pages = (self.site_pages + 1).min(self.max_pages);
                self.current_step =
                    (self.site_offset(index) + self.site_pages).min(self.total_steps);
                self.visited_pages = self.visited_before_site + self.site_pages;
                self.label = format!("[{}/{}] {}", index + 1, total, label);
            }
            SessionEvent::SiteFinished {
                index,
                total,
                summary,
            } => {
                self.visited_pages = self.visited_before_site + summary.visited_pages;
                self.explored_links += summary.explored_links;
                self.current_step = self.site_offset(index + 1);
                self.label = format!("Site {}/{} finished", index + 1, total);
                self.current_url = self.urls.get(index + 1).cloned();
                self.sites.push(summary.clone());
            }
            SessionEvent::Enriching { contacts } => {
                self.label = format!("Enriching {} contacts", contacts);
            }
        }
    }

    /// Stores the final session outcome
    pub fn finish(&mut self, report: SessionReport, export_path: Option<PathBuf>) {
        self.status = report.status.into();
        self.finished = true;
        self.current_step = self.total_steps;
        self.visited_pages = report.visited_pages;
        self.explored_links = report.explored_links;
        self.errors = report.errors;
        self.notes = report.notes;
        self.sites = report.sites;
        self.contacts = report.contacts;
        self.export_path = export_path;
        self.completed_at = Some(Utc::now());
        self.label = "Crawl finished".to_string();
        self.current_url = None;
        self.current_url_index = self.urls.len();
    }

    /// Marks the job as failed; contacts are withheld
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = JobStatus::Error;
        self.error_message = Some(message.into());
        self.finished = true;
        self.current_step = self.total_steps;
        self.completed_at = Some(Utc::now());
        self.label = "Error during crawl".to_string();
    }

    fn site_offset(&self, index: usize) -> u32 {
        (index as u32)
            .saturating_mul(self.max_pages)
            .min(self.total_steps)
    }
}

/// Shared map of jobs
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<Mutex<HashMap<JobId, Job>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, job: Job) -> JobId {
        let id = job.id;
        self.lock().insert(id, job);
        id
    }

    /// Snapshot of a job
    pub fn get(&self, id: JobId) -> Option<Job> {
        self.lock().get(&id).cloned()
    }

    /// Mutates a job in place; returns false when the id is unknown
    pub fn update<F>(&self, id: JobId, f: F) -> bool
    where
        F: FnOnce(&mut Job),
    {
        match self.lock().get_mut(&id) {
            Some(job) => {
                f(job);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::Usage;

    fn summary(url: &str, visited: u32, links: u32) -> SiteSummary {
        SiteSummary {
            url: url.to_string(),
            status: CrawlStatus::NotFound,
            contacts: 0,
            visited_pages: visited,
            explored_links: links,
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_total_steps_at_least_one() {
        assert_eq!(Job::new(Vec::new(), 20).total_steps, 1);
        assert_eq!(Job::new(vec!["a".into(), "b".into()], 20).total_steps, 40);
    }

    #[test]
    fn test_progress_through_sites() {
        let mut job = Job::new(vec!["https://a.example".into(), "https://b.example".into()], 2);

        job.record(SessionEvent::SiteStarted {
            index: 0,
            total: 2,
            url: "https://a.example",
        });
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.current_url_index, 1);

        for _ in 0..3 {
            job.record(SessionEvent::Page {
                index: 0,
                total: 2,
                label: "a.example/",
            });
        }
        // page steps are capped at max_pages per site
        assert_eq!(job.current_step, 2);
        assert_eq!(job.visited_pages, 2);
        assert_eq!(job.label, "[1/2] a.example/");

        let done = summary("https://a.example", 2, 7);
        job.record(SessionEvent::SiteFinished {
            index: 0,
            total: 2,
            summary: &done,
        });
        assert_eq!(job.explored_links, 7);
        assert_eq!(job.current_url.as_deref(), Some("https://b.example"));
        assert_eq!(job.progress_percent(), 50);

        job.record(SessionEvent::SiteStarted {
            index: 1,
            total: 2,
            url: "https://b.example",
        });
        job.record(SessionEvent::Page {
            index: 1,
            total: 2,
            label: "b.example/",
        });
        assert_eq!(job.visited_pages, 3);
        assert_eq!(job.current_step, 3);
    }

    #[test]
    fn test_contacts_hidden_until_finished() {
        let mut job = Job::new(vec!["https://a.example".into()], 5);
        let report = SessionReport {
            contacts: vec![Contact::email("a@a.example", "", "https://a.example/")],
            status: CrawlStatus::Ok,
            visited_pages: 1,
            explored_links: 0,
            errors: Vec::new(),
            sites: Vec::new(),
            notes: Vec::new(),
            usage: Usage::default(),
        };
        assert!(job.contacts().is_empty());

        job.finish(report, None);
        assert_eq!(job.status, JobStatus::Ok);
        assert_eq!(job.contacts().len(), 1);
        assert_eq!(job.progress(), 1.0);

        job.fail("boom");
        assert!(job.contacts().is_empty());
        assert_eq!(job.contacts_count(), 1);
        assert_eq!(job.error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_registry_update_and_snapshot() {
        let registry = JobRegistry::new();
        let id = registry.insert(Job::new(vec!["https://a.example".into()], 5));

        let snapshot = registry.get(id).unwrap();
        assert!(registry.update(id, |job| job.label = "changed".into()));
        assert_eq!(snapshot.label, "");
        assert_eq!(registry.get(id).unwrap().label, "changed");

        assert!(!registry.update(Uuid::new_v4(), |_| {}));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_status_from_crawl() {
        assert_eq!(JobStatus::from(CrawlStatus::Restricted), JobStatus::Restricted);
        assert_eq!(JobStatus::NotFound.to_string(), "NOT_FOUND");
    }
}
