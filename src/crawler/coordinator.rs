//! Crawl coordination - the per-site crawl loop
//!
//! This module ties the frontier, the fetcher and the page parser together:
//! - Seeding the frontier from the normalized base URL
//! - Fetching pages one at a time with a politeness delay
//! - Mining contacts into a site-wide dedup store
//! - Following ranked links until the page or depth budget runs out
//! - Classifying the outcome

use crate::config::CrawlSettings;
use crate::contact::{Contact, CrawlStatus, DedupStore};
use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::parse_page;
use crate::extract::ContactMiner;
use crate::url::{ensure_scheme, normalize_url, short_label, ScopeFilter};
use reqwest::Client;
use serde::Serialize;

/// Per-page progress hook, called with a short label of the page URL
pub type ProgressFn<'a> = dyn Fn(&str) + Send + Sync + 'a;

/// Outcome of crawling one site
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    pub contacts: Vec<Contact>,
    pub status: CrawlStatus,

    /// Pages that produced an HTTP response
    pub visited_pages: u32,

    /// In-scope link candidates seen before truncation
    pub explored_links: u32,

    /// Non-fatal problems, one line per page
    pub errors: Vec<String>,
}

impl CrawlResult {
    fn failed(error: String) -> Self {
        Self {
            contacts: Vec::new(),
            status: CrawlStatus::NotFound,
            visited_pages: 0,
            explored_links: 0,
            errors: vec![error],
        }
    }
}

/// Crawls one site breadth-first
///
/// The HTTP client is supplied by the caller so that one connection pool can
/// serve many crawls.
pub struct Crawler {
    client: Client,
    settings: CrawlSettings,
    miner: ContactMiner,
}

impl Crawler {
    pub fn new(client: Client, settings: CrawlSettings) -> Self {
        Self {
            client,
            settings,
            miner: ContactMiner::new(),
        }
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Runs the crawl to completion
    ///
    /// Transport failures and refused pages are recorded in
    /// `CrawlResult::errors` and never abort the crawl. An unusable base URL
    /// yields an empty `NOT_FOUND` result carrying the reason.
    pub async fn run(&self, progress: Option<&ProgressFn<'_>>) -> CrawlResult {
        let base = ensure_scheme(&self.settings.base_url);

        let seed = match normalize_url(&base) {
            Ok(seed) => seed,
            Err(e) => return CrawlResult::failed(format!("{}: {}", base, e)),
        };
        let scope = match ScopeFilter::new(&seed) {
            Ok(scope) => scope,
            Err(e) => return CrawlResult::failed(format!("{}: {}", seed, e)),
        };

        tracing::info!(
            "Crawling {} (max {} pages, depth {})",
            seed,
            self.settings.max_pages,
            self.settings.max_depth
        );

        let mut frontier = Frontier::new(seed.clone());
        let mut store: DedupStore = DedupStore::new();
        let mut restricted = false;
        let mut visited_pages = 0u32;
        let mut explored_links = 0u32;
        let mut errors = Vec::new();

        while frontier.visited_count() < self.settings.max_pages as usize {
            let Some(entry) = frontier.next_unvisited() else {
                tracing::debug!("Frontier is empty");
                break;
            };

            if let Some(progress) = progress {
                progress(&short_label(entry.url.as_str()));
            }

            tracing::debug!("Fetching {} (depth {})", entry.url, entry.depth);

            let fetched = fetch_url(
                &self.client,
                entry.url.as_str(),
                &self.settings.user_agent,
                self.settings.request_timeout,
            )
            .await;

            if fetched.responded() {
                visited_pages += 1;
            }

            let body = match fetched {
                FetchResult::Page {
                    final_url,
                    status_code,
                    body,
                } => {
                    if final_url != entry.url.as_str() {
                        tracing::debug!("{} redirected to {}", entry.url, final_url);
                    }
                    tracing::debug!(
                        "Fetched {} ({}, {} bytes)",
                        final_url,
                        status_code,
                        body.len()
                    );
                    body
                }
                FetchResult::Restricted { status_code } => {
                    tracing::warn!("Access restricted at {} ({})", entry.url, status_code);
                    restricted = true;
                    errors.push(format!("{}: restricted access ({})", entry.url, status_code));
                    continue;
                }
                FetchResult::ContentMismatch { content_type } => {
                    tracing::debug!("Skipping non-HTML {} ({})", entry.url, content_type);
                    continue;
                }
                FetchResult::BodyError { error } | FetchResult::NetworkError { error } => {
                    tracing::warn!("Failed to fetch {}: {}", entry.url, error);
                    errors.push(format!("{}: {}", entry.url, error));
                    continue;
                }
            };

            let link_limit = (entry.depth < self.settings.max_depth)
                .then_some(self.settings.max_links_per_page as usize);

            let parsed = parse_page(&body, &entry.url, &self.miner, &scope, link_limit);
            let added = store.extend(parsed.contacts);
            if added > 0 {
                tracing::debug!("{} new contacts on {}", added, entry.url);
            }

            if link_limit.is_some() {
                explored_links += parsed.links.considered as u32;
                frontier.enqueue_all(parsed.links.links, entry.depth + 1);
            }

            tokio::time::sleep(self.settings.delay).await;
        }

        let contacts = store.into_contacts();
        let status = CrawlStatus::classify(!contacts.is_empty(), restricted);

        tracing::info!(
            "Finished {}: {} pages, {} contacts, status {}",
            seed,
            visited_pages,
            contacts.len(),
            status
        );

        CrawlResult {
            contacts,
            status,
            visited_pages,
            explored_links,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_base_url_is_not_found() {
        let settings = CrawlSettings::new("ftp://example.com/");
        let result = Crawler::new(Client::new(), settings).run(None).await;

        assert_eq!(result.status, CrawlStatus::NotFound);
        assert_eq!(result.visited_pages, 0);
        assert_eq!(result.errors.len(), 1);
    }
}
