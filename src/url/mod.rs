//! URL handling module for Topic-Sieve
//!
//! This module provides URL normalization, host extraction, and the
//! same-host scope check that keeps a crawl on its seed's site.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::extract_host;
pub use normalize::normalize_url;

use ::url::Url;

/// Returns true if `candidate` lives on the same host as `scope`
///
/// Hosts are compared case-insensitively. Ports and schemes are ignored, so
/// `http://example.com/a` and `https://example.com:8443/b` share a scope.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use topic_sieve::url::in_scope;
///
/// let scope = Url::parse("https://example.com/").unwrap();
/// assert!(in_scope(&Url::parse("https://EXAMPLE.com/page").unwrap(), &scope));
/// assert!(!in_scope(&Url::parse("https://other.com/page").unwrap(), &scope));
/// ```
pub fn in_scope(candidate: &Url, scope: &Url) -> bool {
    match (extract_host(candidate), extract_host(scope)) {
        (Some(candidate_host), Some(scope_host)) => candidate_host == scope_host,
        _ => false,
    }
}
