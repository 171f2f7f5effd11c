//! Crawler module for bounded, per-site contact crawling
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and response classification
//! - HTML parsing, contact mining and link ranking
//! - The breadth-first frontier
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{CrawlResult, Crawler, ProgressFn};
pub use fetcher::{build_http_client, fetch_url, FetchResult, RESTRICTED_STATUS};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{parse_page, ParsedPage};
