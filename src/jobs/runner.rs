//! Bounded background execution of harvesting jobs

use crate::config::Config;
use crate::contact::Contact;
use crate::crawler::build_http_client;
use crate::enrich::Enricher;
use crate::jobs::registry::{Job, JobId, JobRegistry};
use crate::output::{export_path, exporter_for, Exporter, WebhookClient};
use crate::session::{run_pipeline, SessionEvent, SessionObserver};
use crate::HarvestError;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Runs jobs on tokio tasks, at most `max-workers` at a time
///
/// Each job crawls its sites, enriches the merged contacts, exports them and
/// delivers them to the webhook when one is configured. Progress and the final
/// outcome are written to the shared [`JobRegistry`].
#[derive(Clone)]
pub struct JobRunner {
    registry: JobRegistry,
    client: Client,
    config: Arc<Config>,
    enricher: Option<Enricher>,
    exporter: Arc<dyn Exporter>,
    webhook: Option<WebhookClient>,
    permits: Arc<Semaphore>,
}

impl JobRunner {
    /// Builds a runner from the configuration
    ///
    /// Enrichment goes through the OpenAI Responses API when enabled.
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config)?;
        let enricher = config
            .enrichment
            .enabled
            .then(|| Enricher::from_config(client.clone(), &config.enrichment));
        let exporter: Arc<dyn Exporter> = Arc::from(exporter_for(config.output.format));
        let webhook = WebhookClient::from_config(client.clone(), &config.webhook);
        let permits = Arc::new(Semaphore::new(config.jobs.max_workers.max(1)));

        Ok(Self {
            registry: JobRegistry::new(),
            client,
            config: Arc::new(config),
            enricher,
            exporter,
            webhook,
            permits,
        })
    }

    /// Replaces the enricher
    pub fn with_enricher(mut self, enricher: Option<Enricher>) -> Self {
        self.enricher = enricher;
        self
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registers a job and starts it in the background
    ///
    /// The returned handle resolves once the job has reached a final state.
    pub fn submit(&self, urls: Vec<String>) -> Result<(JobId, JoinHandle<()>), HarvestError> {
        let urls: Vec<String> = urls
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        if urls.is_empty() {
            return Err(HarvestError::InvalidInput(
                "at least one URL is required".to_string(),
            ));
        }

        let id = self
            .registry
            .insert(Job::new(urls.clone(), self.config.crawler.max_pages));
        tracing::info!("Job {} queued for {} site(s)", id, urls.len());

        let runner = self.clone();
        let handle = tokio::spawn(async move {
            let registry = runner.registry.clone();

            let _permit = match runner.permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    registry.update(id, |job| job.fail(e.to_string()));
                    return;
                }
            };

            // inner task so a panic surfaces as a JoinError instead of a stuck job
            let outcome = tokio::spawn(runner.execute(id, urls)).await;
            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(e) => Some(HarvestError::Worker(e.to_string()).to_string()),
            };

            if let Some(message) = failure {
                tracing::error!("Job {} failed: {}", id, message);
                registry.update(id, |job| job.fail(message));
            }
        });

        Ok((id, handle))
    }

    async fn execute(self, id: JobId, urls: Vec<String>) -> Result<(), HarvestError> {
        let registry = self.registry.clone();
        let observer = move |event: SessionEvent<'_>| {
            if let SessionEvent::Page { label, .. } = event {
                tracing::debug!("Job {}: {}", id, label);
            }
            registry.update(id, |job| job.record(event));
        };

        let report = run_pipeline(
            &self.client,
            &self.config,
            &urls,
            self.enricher.as_ref(),
            Some(&observer as &SessionObserver),
        )
        .await;

        let export = if report.contacts.is_empty() {
            None
        } else {
            Some(self.export(id, &report.contacts).await?)
        };

        let status = report.status;
        let found = report.contacts.len();
        let contacts = self
            .webhook
            .as_ref()
            .filter(|_| found > 0)
            .map(|_| report.contacts.clone());

        self.registry.update(id, |job| job.finish(report, export));
        tracing::info!("Job {} finished with status {} ({} contacts)", id, status, found);

        if let (Some(webhook), Some(contacts)) = (self.webhook.as_ref(), contacts) {
            let snapshot = self.registry.get(id);
            let delivery = webhook.deliver(&contacts, snapshot.as_ref()).await;
            self.registry.update(id, |job| job.webhook = Some(delivery));
        }

        Ok(())
    }

    async fn export(&self, id: JobId, contacts: &[Contact]) -> Result<PathBuf, HarvestError> {
        let exporter = Arc::clone(&self.exporter);
        let path = export_path(&self.config.output.directory, &id.to_string(), exporter.as_ref());
        let contacts = contacts.to_vec();

        let written = tokio::task::spawn_blocking(move || exporter.export(&contacts, &path))
            .await
            .map_err(|e| HarvestError::Worker(e.to_string()))??;

        tracing::info!("Exported contacts to {}", written.display());
        Ok(written)
    }
}
