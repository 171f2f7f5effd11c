//! Contact mining
//!
//! Pulls email addresses and phone numbers out of one page in two passes:
//!
//! 1. **Explicit links**: `mailto:` and `tel:` anchors, described by the
//!    anchor text, its `title`, or the enclosing block's text
//! 2. **Free text**: regex scan of the visible text, described by a window
//!    of the text around each match
//!
//! Results are deduplicated per page by `(kind, normalized value)`; the
//! first sighting wins, so explicit links take precedence over free text.

mod phone;
mod text;

pub use phone::{normalize_phone, phone_digits, valid_phone_digits, PhoneScanner};
pub use text::{collapse_whitespace, context_window, element_text, trim_snippet, visible_text};

use crate::contact::{Contact, DedupStore};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const EMAIL_PATTERN: &str = r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}";

/// Ancestors searched for context around a contact link
const CONTEXT_TAGS: &[&str] = &["p", "li", "div", "section"];

/// Extracts contacts from HTML pages
#[derive(Debug, Clone)]
pub struct ContactMiner {
    email_regex: Regex,
    email_exact: Regex,
    phones: PhoneScanner,
    anchor_selector: Selector,
}

impl Default for ContactMiner {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactMiner {
    pub fn new() -> Self {
        Self {
            email_regex: Regex::new(EMAIL_PATTERN).expect("valid email regex"),
            email_exact: Regex::new(&format!("^(?:{})$", EMAIL_PATTERN)).expect("valid email regex"),
            phones: PhoneScanner::new(),
            anchor_selector: Selector::parse("a[href]").expect("valid anchor selector"),
        }
    }

    /// Parses `html` and mines it
    pub fn mine(&self, html: &str, page_url: &str) -> Vec<Contact> {
        let document = Html::parse_document(html);
        self.mine_document(&document, page_url)
    }

    /// Mines an already parsed document
    pub fn mine_document(&self, document: &Html, page_url: &str) -> Vec<Contact> {
        let mut store: DedupStore = DedupStore::new();

        self.mine_links(document, page_url, &mut store);
        self.mine_text(document, page_url, &mut store);

        store.into_contacts()
    }

    fn mine_links(&self, document: &Html, page_url: &str, store: &mut DedupStore) {
        for anchor in document.select(&self.anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let href = href.trim();

            if let Some(target) = href.strip_prefix("mailto:") {
                let email = target.split('?').next().unwrap_or_default().trim();
                if self.email_exact.is_match(email) {
                    let description = anchor_description(anchor, email);
                    store.insert(Contact::email(email, description, page_url));
                }
            } else if let Some(target) = href.strip_prefix("tel:") {
                let raw = target.trim();
                if valid_phone_digits(&phone_digits(raw)) {
                    let description = anchor_description(anchor, raw);
                    store.insert(Contact::phone(normalize_phone(raw), description, page_url));
                }
            }
        }
    }

    fn mine_text(&self, document: &Html, page_url: &str, store: &mut DedupStore) {
        let text = visible_text(document);

        for found in self.email_regex.find_iter(&text) {
            let email = found.as_str();
            let contact = Contact::email(email, "", page_url);
            if store.contains(&contact.dedup_key()) {
                continue;
            }
            let description = context_window(&text, found.start(), found.end(), email);
            store.insert(Contact { description, ..contact });
        }

        for range in self.phones.scan(&text) {
            let raw = &text[range.clone()];
            if !valid_phone_digits(&phone_digits(raw)) {
                continue;
            }
            let contact = Contact::phone(normalize_phone(raw), "", page_url);
            if store.contains(&contact.dedup_key()) {
                continue;
            }
            let description = context_window(&text, range.start, range.end, raw);
            store.insert(Contact { description, ..contact });
        }
    }
}

/// Describes a contact link
///
/// Prefers the anchor text when it says more than the raw value, then the
/// `title` attribute, then the text of the nearest enclosing block.
fn anchor_description(anchor: ElementRef<'_>, value: &str) -> String {
    let text = element_text(anchor);
    if !text.is_empty() && text.to_lowercase() != value.to_lowercase() {
        return text;
    }

    let title = anchor.value().attr("title").unwrap_or_default().trim();
    if !title.is_empty() {
        return title.to_string();
    }

    let block = anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| CONTEXT_TAGS.contains(&el.value().name()));

    if let Some(block) = block {
        let snippet = element_text(block);
        if !snippet.is_empty() {
            return trim_snippet(&snippet, value);
        }
    }

    format!("Found in the link for {}", value)
}
