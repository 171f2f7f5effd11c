use url::Url;

/// Extracts the site domain from a URL
///
/// The host is lower-cased and a leading `www.` is dropped; the port never
/// takes part in the comparison.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use contact_harvest::url::site_domain;
///
/// let url = Url::parse("https://WWW.Example.com:8443/path").unwrap();
/// assert_eq!(site_domain(&url), Some("example.com".to_string()));
/// ```
pub fn site_domain(url: &Url) -> Option<String> {
    url.host_str()
        .map(|h| h.to_lowercase())
        .map(|h| match h.strip_prefix("www.") {
            Some(rest) => rest.to_string(),
            None => h,
        })
        .filter(|h| !h.is_empty())
}

/// Checks whether a candidate domain belongs to the seed's site
///
/// This is a plain suffix match: `blog.example.com` and `example.com` both
/// belong to `example.com`.
pub fn matches_site(seed_domain: &str, candidate: &str) -> bool {
    candidate.ends_with(seed_domain)
}
