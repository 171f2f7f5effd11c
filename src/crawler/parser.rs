//! HTML parser for one crawled page
//!
//! This module parses a page once and extracts:
//! - Contacts (via the contact miner)
//! - Links to follow, filtered to the site and ranked by score
//!
//! The parsed document never crosses an `.await`, so the crawl future stays
//! `Send`.

use crate::contact::Contact;
use crate::extract::ContactMiner;
use crate::url::{rank_links, RankedLinks, ScopeFilter};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Contacts found on the page, deduplicated within the page
    pub contacts: Vec<Contact>,

    /// Links worth following, best first (empty when links were not wanted)
    pub links: RankedLinks,
}

/// Parses HTML content and extracts contacts and, optionally, links
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - The URL the page was fetched from, used to resolve links
/// * `miner` - Contact miner
/// * `scope` - Filter deciding which links stay on the site
/// * `link_limit` - `Some(n)` to keep the best `n` links, `None` to skip link collection
pub fn parse_page(
    html: &str,
    page_url: &Url,
    miner: &ContactMiner,
    scope: &ScopeFilter,
    link_limit: Option<usize>,
) -> ParsedPage {
    let document = Html::parse_document(html);

    let contacts = miner.mine_document(&document, page_url.as_str());

    let links = match link_limit {
        Some(limit) => rank_links(collect_links(&document, page_url, scope), limit),
        None => RankedLinks::default(),
    };

    ParsedPage { contacts, links }
}

/// Collects in-scope links in document order, each once
fn collect_links(document: &Html, page_url: &Url, scope: &ScopeFilter) -> Vec<Url> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(url) = scope.admit(href, page_url) {
            if seen.insert(url.as_str().to_string()) {
                links.push(url);
            }
        }
    }

    links
}
