use crate::UrlError;
use url::Url;

/// Longest URL shown verbatim in progress labels
const LABEL_MAX_LEN: usize = 45;

/// Prefixes `https://` when the input carries no scheme
///
/// # Examples
///
/// ```
/// use contact_harvest::url::ensure_scheme;
///
/// assert_eq!(ensure_scheme("example.com"), "https://example.com");
/// assert_eq!(ensure_scheme("http://example.com"), "http://example.com");
/// ```
pub fn ensure_scheme(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Normalizes a URL for frontier bookkeeping
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not HTTP or HTTPS
/// 3. Reject URLs without a host
/// 4. Remove the fragment (everything after #)
///
/// Path, query and host casing are left untouched so the fetched URL is the
/// one the page linked to.
///
/// # Examples
///
/// ```
/// use contact_harvest::url::normalize_url;
///
/// let url = normalize_url("https://example.com/contact#form").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/contact");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Shortens a URL for progress output, keeping its tail
pub fn short_label(url: &str) -> String {
    let count = url.chars().count();
    if count <= LABEL_MAX_LEN {
        return url.to_string();
    }
    let tail: String = url.chars().skip(count - LABEL_MAX_LEN).collect();
    format!("...{}", tail)
}
