//! Contact data model
//!
//! This module defines the contact record shared by the miner, the crawler,
//! the enrichment orchestrator and the exporters:
//!
//! - `Contact`: one email address or phone number with its context
//! - `DedupStore`: first-seen-wins deduplication keyed by normalized value
//! - `CrawlStatus`: outcome classification of a crawl

mod dedup;

pub use dedup::{DedupKey, DedupStore, SiteKey};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kind of contact detail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Email,
    Phone,
}

impl ContactKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A contact detail discovered on a page
///
/// `value` is stored normalized for phones (optional `+` and digits only);
/// emails keep their original casing and are lower-cased only for keying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub kind: ContactKind,
    pub value: String,
    pub description: String,
    pub source_url: String,

    /// Input URL of the site this contact was found on (multi-site runs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,

    /// Validity verdict from enrichment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated: Option<bool>,

    /// Short role label written during enrichment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enriched_description: Option<String>,

    /// Reasons attached during enrichment
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: BTreeSet<String>,
}

impl Contact {
    pub fn new(
        kind: ContactKind,
        value: impl Into<String>,
        description: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            value: value.into(),
            description: description.into(),
            source_url: source_url.into(),
            site: None,
            validated: None,
            enriched_description: None,
            flags: BTreeSet::new(),
        }
    }

    pub fn email(
        value: impl Into<String>,
        description: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self::new(ContactKind::Email, value, description, source_url)
    }

    pub fn phone(
        value: impl Into<String>,
        description: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self::new(ContactKind::Phone, value, description, source_url)
    }

    /// Value used for key comparisons
    pub fn normalized_value(&self) -> String {
        match self.kind {
            ContactKind::Email => self.value.to_lowercase(),
            ContactKind::Phone => self.value.clone(),
        }
    }

    /// Key used for deduplication within a page or a single site
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            kind: self.kind,
            value: self.normalized_value(),
        }
    }

    /// Key used when aggregating several sites
    pub fn site_key(&self) -> SiteKey {
        SiteKey {
            kind: self.kind,
            value: self.normalized_value(),
            source_url: self.source_url.to_lowercase(),
        }
    }
}

/// Outcome of crawling one site (or a whole session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrawlStatus {
    Ok,
    NotFound,
    Restricted,
}

impl CrawlStatus {
    /// Classifies a crawl; found contacts always win over restriction
    pub fn classify(has_contacts: bool, restricted: bool) -> Self {
        if has_contacts {
            Self::Ok
        } else if restricted {
            Self::Restricted
        } else {
            Self::NotFound
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotFound => "NOT_FOUND",
            Self::Restricted => "RESTRICTED",
        }
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orders contacts for presentation
///
/// Validated contacts come first, then contacts are grouped by site, kind
/// and value (case-insensitive). The sort is stable.
pub fn sort_contacts(contacts: &mut [Contact]) {
    contacts.sort_by_cached_key(|c| {
        (
            c.validated != Some(true),
            c.site.as_deref().unwrap_or_default().to_lowercase(),
            c.kind.label(),
            c.value.to_lowercase(),
        )
    });
}
