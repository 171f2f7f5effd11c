use crate::url::domain::{matches_site, site_domain};
use crate::url::normalize::normalize_url;
use crate::UrlError;
use url::Url;

/// Path extensions that never lead to an HTML page
const SKIP_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".ico", ".css", ".js", ".json", ".xml",
    ".mp4", ".mov", ".avi", ".zip", ".rar", ".gz", ".tar", ".woff", ".woff2", ".ttf",
];

/// href prefixes that are never followed
const SKIP_PREFIXES: &[&str] = &["#", "mailto:", "tel:", "javascript:", "data:"];

/// Decides whether a discovered link is eligible for crawling
///
/// A link is in scope when it resolves to an http(s) URL on the seed's site
/// (suffix match on the host without `www.`) whose path does not end in a
/// binary or asset extension.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    seed_domain: String,
}

impl ScopeFilter {
    /// Creates a filter anchored on the seed URL's site
    pub fn new(seed: &Url) -> Result<Self, UrlError> {
        let seed_domain = site_domain(seed).ok_or(UrlError::MissingDomain)?;
        Ok(Self { seed_domain })
    }

    /// The domain every admitted link must belong to
    pub fn seed_domain(&self) -> &str {
        &self.seed_domain
    }

    /// Resolves `href` against the current page and returns the normalized
    /// absolute URL when the link is eligible
    pub fn admit(&self, href: &str, current_url: &Url) -> Option<Url> {
        let href = href.trim();

        if href.is_empty() || SKIP_PREFIXES.iter().any(|p| href.starts_with(p)) {
            return None;
        }

        let absolute = current_url.join(href).ok()?;
        if absolute.scheme() != "http" && absolute.scheme() != "https" {
            return None;
        }

        let path_lower = absolute.path().to_lowercase();
        if SKIP_EXTENSIONS.iter().any(|ext| path_lower.ends_with(ext)) {
            return None;
        }

        let target_domain = site_domain(&absolute)?;
        if !matches_site(&self.seed_domain, &target_domain) {
            tracing::trace!("Out of scope: {}", absolute);
            return None;
        }

        normalize_url(absolute.as_str()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ScopeFilter {
        ScopeFilter::new(&Url::parse("https://www.example.com/").unwrap()).unwrap()
    }

    fn page() -> Url {
        Url::parse("https://example.com/team/").unwrap()
    }

    #[test]
    fn test_relative_link_is_resolved() {
        let url = filter().admit("contact", &page()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/team/contact");
    }

    #[test]
    fn test_fragment_is_removed() {
        let url = filter().admit("/about#staff", &page()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/about");
    }

    #[test]
    fn test_subdomain_in_scope() {
        assert!(filter()
            .admit("https://help.example.com/", &page())
            .is_some());
    }

    #[test]
    fn test_other_domain_rejected() {
        assert!(filter().admit("https://other.com/contact", &page()).is_none());
    }

    #[test]
    fn test_special_schemes_rejected() {
        let f = filter();
        for href in [
            "#top",
            "mailto:a@example.com",
            "tel:+123456789",
            "javascript:void(0)",
            "data:text/html,hi",
            "ftp://example.com/file",
            "",
        ] {
            assert!(f.admit(href, &page()).is_none(), "{} was admitted", href);
        }
    }

    #[test]
    fn test_asset_extensions_rejected() {
        let f = filter();
        for href in ["/logo.PNG", "/site.css", "/app.js", "/archive.tar", "/font.woff2"] {
            assert!(f.admit(href, &page()).is_none(), "{} was admitted", href);
        }
        assert!(f.admit("/brochure.pdf", &page()).is_some());
    }
}
