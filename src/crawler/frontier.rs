//! Crawl frontier: the FIFO queue of discovered URLs and the bookkeeping
//! that keeps every URL visited at most once
//!
//! The frontier hands out URLs in discovery order, which makes a crawl
//! breadth-first and gives the same visitation order for the same site on
//! every run.

use crate::url::{in_scope, normalize_url};
use crate::UrlError;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// What `Frontier::enqueue` did with a link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    /// Appended to the tail of the queue
    Queued,
    /// Already visited or already waiting in the queue
    Duplicate,
    /// Host differs from the crawl scope
    OutOfScope,
    /// Unparsable, relative, hostless, or not http(s)
    Rejected,
}

/// FIFO frontier with visited and pending sets
///
/// Invariants:
/// - a URL is never both visited and pending
/// - a URL is pending at most once
/// - the visited set only grows
#[derive(Debug, Clone)]
pub struct Frontier {
    queue: VecDeque<Url>,
    pending: HashSet<String>,
    visited: HashSet<String>,
    scope: Url,
}

impl Frontier {
    /// Creates a frontier holding only the seed URL
    ///
    /// The seed's host becomes the frontier's default scope.
    ///
    /// # Arguments
    ///
    /// * `seed` - An absolute http(s) URL
    ///
    /// # Returns
    ///
    /// * `Ok(Frontier)` - Frontier with one pending entry
    /// * `Err(UrlError)` - The seed is not an absolute http(s) URL
    ///
    /// # Example
    ///
    /// ```
    /// use topic_sieve::crawler::Frontier;
    ///
    /// let mut frontier = Frontier::new("https://example.com/").unwrap();
    /// assert_eq!(frontier.next().unwrap().as_str(), "https://example.com/");
    /// assert!(frontier.is_exhausted());
    /// ```
    pub fn new(seed: &str) -> Result<Self, UrlError> {
        let seed = normalize_url(seed)?;

        let mut frontier = Self {
            queue: VecDeque::new(),
            pending: HashSet::new(),
            visited: HashSet::new(),
            scope: seed.clone(),
        };
        frontier.pending.insert(seed.as_str().to_string());
        frontier.queue.push_back(seed);

        Ok(frontier)
    }

    /// Offers a discovered link to the frontier
    ///
    /// The link is normalized first, so `https://a.com/p#top` is the same
    /// entry as `https://a.com/p`. Links that are malformed, out of scope, or
    /// already known are dropped without error.
    ///
    /// # Arguments
    ///
    /// * `link` - Absolute URL string as extracted from a page
    /// * `scope` - Only links on this URL's host are accepted
    pub fn enqueue(&mut self, link: &str, scope: &Url) -> Enqueue {
        let url = match normalize_url(link) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!(link, error = %e, "Dropping unusable link");
                return Enqueue::Rejected;
            }
        };

        if !in_scope(&url, scope) {
            tracing::debug!(link = %url, "Dropping out-of-scope link");
            return Enqueue::OutOfScope;
        }

        let key = url.as_str();
        if self.visited.contains(key) || self.pending.contains(key) {
            return Enqueue::Duplicate;
        }

        self.pending.insert(key.to_string());
        self.queue.push_back(url);
        Enqueue::Queued
    }

    /// Pops the head of the queue and marks it visited
    ///
    /// Entries already claimed through [`Frontier::mark_visited`] are
    /// skipped. Returns None once nothing is pending.
    pub fn next(&mut self) -> Option<Url> {
        while let Some(url) = self.queue.pop_front() {
            if !self.pending.remove(url.as_str()) {
                continue;
            }
            self.visited.insert(url.as_str().to_string());
            return Some(url);
        }
        None
    }

    /// Marks a URL reached some other way (such as the end of a redirect
    /// chain) as visited
    ///
    /// Returns true if the URL was not visited before; a pending entry for it
    /// is withdrawn. Returns false for already visited or unusable URLs.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        let Ok(url) = normalize_url(url.as_str()) else {
            return false;
        };
        let key = url.as_str();
        if self.visited.contains(key) {
            return false;
        }
        self.pending.remove(key);
        self.visited.insert(key.to_string());
        true
    }

    /// Returns true if no URL is waiting to be visited
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }

    /// The seed URL whose host bounds the crawl
    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// Number of URLs waiting to be visited
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of URLs already handed out by `next`
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Returns true if `url` has already been handed out
    pub fn has_visited(&self, url: &str) -> bool {
        normalize_url(url)
            .map(|url| self.visited.contains(url.as_str()))
            .unwrap_or(false)
    }
}
