use url::Url;

/// Extracts the host from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (`mailto:`, `data:` and friends), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use topic_sieve::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
