//! Multi-site harvesting sessions
//!
//! A session crawls several sites one after another with a shared HTTP
//! client, merges their contacts, and optionally enriches and orders the
//! result. Progress is reported through [`SessionEvent`]s so that the CLI and
//! the job runner can present it their own way.

use crate::completion::Usage;
use crate::config::{Config, CrawlSettings};
use crate::contact::{sort_contacts, Contact, CrawlStatus, DedupStore, SiteKey};
use crate::crawler::Crawler;
use crate::enrich::Enricher;
use reqwest::Client;
use serde::Serialize;

/// Outcome of one site within a session
#[derive(Debug, Clone, Serialize)]
pub struct SiteSummary {
    pub url: String,
    pub status: CrawlStatus,
    pub contacts: usize,
    pub visited_pages: u32,
    pub explored_links: u32,
    pub errors: Vec<String>,
}

/// Progress notifications emitted while a session runs
///
/// `index` is 0-based; `total` is the number of sites in the session.
#[derive(Debug, Clone, Copy)]
pub enum SessionEvent<'a> {
    SiteStarted {
        index: usize,
        total: usize,
        url: &'a str,
    },
    Page {
        index: usize,
        total: usize,
        label: &'a str,
    },
    SiteFinished {
        index: usize,
        total: usize,
        summary: &'a SiteSummary,
    },
    Enriching {
        contacts: usize,
    },
}

pub type SessionObserver = dyn Fn(SessionEvent<'_>) + Send + Sync;

/// Merged outcome of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub contacts: Vec<Contact>,
    pub status: CrawlStatus,
    pub visited_pages: u32,
    pub explored_links: u32,

    /// Crawl errors, each prefixed with `[site]`
    pub errors: Vec<String>,

    pub sites: Vec<SiteSummary>,

    /// Enrichment notes
    pub notes: Vec<String>,

    #[serde(skip)]
    pub usage: Usage,
}

fn emit(observer: Option<&SessionObserver>, event: SessionEvent<'_>) {
    if let Some(observer) = observer {
        observer(event);
    }
}

/// Crawls every site in order and merges the results
///
/// Contacts are kept once per `(kind, value, page)`; each is tagged with the
/// input URL of the site it was found on. The overall status is `OK` when any
/// contact was found, `RESTRICTED` when none were and at least one site was
/// restricted, and `NOT_FOUND` otherwise.
pub async fn harvest_sites(
    client: &Client,
    config: &Config,
    urls: &[String],
    observer: Option<&SessionObserver>,
) -> SessionReport {
    let total = urls.len();

    let mut store: DedupStore<SiteKey> = DedupStore::new();
    let mut sites = Vec::with_capacity(total);
    let mut errors = Vec::new();
    let mut visited_pages = 0;
    let mut explored_links = 0;
    let mut restricted_sites = 0;

    for (index, url) in urls.iter().enumerate() {
        emit(
            observer,
            SessionEvent::SiteStarted {
                index,
                total,
                url: url.as_str(),
            },
        );

        let crawler = Crawler::new(client.clone(), CrawlSettings::for_site(config, url));
        let page_hook = move |label: &str| emit(observer, SessionEvent::Page { index, total, label });
        let result = crawler.run(Some(&page_hook)).await;

        visited_pages += result.visited_pages;
        explored_links += result.explored_links;
        if result.status == CrawlStatus::Restricted {
            restricted_sites += 1;
        }
        errors.extend(result.errors.iter().map(|e| format!("[{}] {}", url, e)));

        let found = result.contacts.len();
        for mut contact in result.contacts {
            if contact.site.is_none() {
                contact.site = Some(url.clone());
            }
            store.insert(contact);
        }

        let summary = SiteSummary {
            url: url.clone(),
            status: result.status,
            contacts: found,
            visited_pages: result.visited_pages,
            explored_links: result.explored_links,
            errors: result.errors,
        };
        emit(
            observer,
            SessionEvent::SiteFinished {
                index,
                total,
                summary: &summary,
            },
        );
        sites.push(summary);
    }

    let contacts = store.into_contacts();
    let status = CrawlStatus::classify(!contacts.is_empty(), restricted_sites > 0);

    tracing::info!(
        "Session over {} sites finished: {} contacts, status {}",
        total,
        contacts.len(),
        status
    );

    SessionReport {
        contacts,
        status,
        visited_pages,
        explored_links,
        errors,
        sites,
        notes: Vec::new(),
        usage: Usage::default(),
    }
}

/// Harvests, enriches (when an enricher is given) and orders contacts
pub async fn run_pipeline(
    client: &Client,
    config: &Config,
    urls: &[String],
    enricher: Option<&Enricher>,
    observer: Option<&SessionObserver>,
) -> SessionReport {
    let mut report = harvest_sites(client, config, urls, observer).await;

    if let Some(enricher) = enricher {
        if !report.contacts.is_empty() {
            emit(
                observer,
                SessionEvent::Enriching {
                    contacts: report.contacts.len(),
                },
            );
            let enrichment = enricher.enrich(std::mem::take(&mut report.contacts)).await;
            report.contacts = enrichment.contacts;
            report.notes = enrichment.notes;
            report.usage = enrichment.usage;
        }
    }

    sort_contacts(&mut report.contacts);
    report
}
