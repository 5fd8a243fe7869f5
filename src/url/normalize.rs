use crate::UrlError;
use url::Url;

/// Normalizes a URL into the form used as the crawl's dedup key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Reject any scheme other than `http` and `https`
/// 3. Reject URLs without a host
/// 4. Lowercase the host, drop the default port, resolve dot segments
///    (handled by the parser itself)
/// 5. Remove the fragment (everything after #)
/// 6. Remove an empty query string (trailing ?)
///
/// The path and the remaining query are kept verbatim, so `/page` and
/// `/page/` stay distinct pages.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse or normalize the URL
///
/// # Examples
///
/// ```
/// use topic_sieve::url::normalize_url;
///
/// let url = normalize_url("HTTPS://Example.COM/a/../page?x=1#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page?x=1");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingHost),
    }

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}
