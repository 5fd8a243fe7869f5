//! Per-page pipeline: fetch, extract, classify, conditionally store
//!
//! One call handles one URL from start to finish and never fails: every
//! collaborator error is turned into a [`PageOutcome`] and logged, so the
//! crawl loop can always move on to the next URL.
//!
//! A page reached through a same-host redirect is handled under its final
//! URL. The caller decides through a claim callback whether that URL is
//! still unvisited; a page already seen is skipped as a duplicate.

use crate::classifier::Classifier;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::parse_html;
use crate::state::PageOutcome;
use crate::storage::{ContentStore, StoreKey};
use crate::url::{in_scope, normalize_url};
use std::sync::Arc;
use url::Url;

/// What processing one page produced
#[derive(Debug, Clone)]
pub struct PageResult {
    pub outcome: PageOutcome,
    /// Outbound links, absolute; empty when the page was not fetched
    pub links: Vec<String>,
}

impl PageResult {
    fn skipped(outcome: PageOutcome) -> Self {
        Self {
            outcome,
            links: Vec::new(),
        }
    }
}

/// The collaborators a page passes through
#[derive(Clone)]
pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn ContentStore>,
    scope: Url,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn ContentStore>,
        scope: Url,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            store,
            scope,
        }
    }

    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// Runs one page through fetch, extract, classify and store
    ///
    /// # Arguments
    ///
    /// * `url` - The URL popped from the frontier
    /// * `claim_redirect` - Called with the final URL when redirects ended
    ///   somewhere else on the crawl host; returns false if that URL was
    ///   already visited
    pub async fn process<F>(&self, url: &Url, claim_redirect: F) -> PageResult
    where
        F: FnOnce(&Url) -> bool + Send,
    {
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url = %url, outcome = %PageOutcome::FetchFailed, error = %e, "Fetch failed");
                return PageResult::skipped(PageOutcome::FetchFailed);
            }
        };

        if !page.is_success() {
            tracing::warn!(url = %url, outcome = %PageOutcome::HttpError, status = page.status, "Non-success status");
            return PageResult::skipped(PageOutcome::HttpError);
        }

        if !in_scope(&page.final_url, &self.scope) {
            tracing::info!(
                url = %url,
                outcome = %PageOutcome::OffScopeRedirect,
                final_url = %page.final_url,
                "Redirected off the crawl host"
            );
            return PageResult::skipped(PageOutcome::OffScopeRedirect);
        }

        let page_url = match normalize_url(page.final_url.as_str()) {
            Ok(final_url) if final_url != *url => {
                if !claim_redirect(&final_url) {
                    tracing::info!(
                        url = %url,
                        outcome = %PageOutcome::DuplicateRedirect,
                        final_url = %final_url,
                        "Redirected to an already visited page"
                    );
                    return PageResult::skipped(PageOutcome::DuplicateRedirect);
                }
                tracing::debug!(url = %url, final_url = %final_url, "Following redirect target");
                final_url
            }
            _ => url.clone(),
        };

        if !page.is_html() {
            tracing::info!(
                url = %url,
                outcome = %PageOutcome::NotHtml,
                content_type = page.content_type.as_deref().unwrap_or(""),
                "Skipping non-HTML response"
            );
            return PageResult::skipped(PageOutcome::NotHtml);
        }

        let parsed = parse_html(&page.body, &page.final_url);
        tracing::info!(
            url = %url,
            status = page.status,
            title = parsed.title.as_deref().unwrap_or(""),
            links = parsed.links.len(),
            bytes = parsed.text.len(),
            "Fetched"
        );

        let outcome = self.classify_and_store(&page_url, &parsed.text).await;

        PageResult {
            outcome,
            links: parsed.links,
        }
    }

    async fn classify_and_store(&self, url: &Url, text: &str) -> PageOutcome {
        let relevant = if text.is_empty() {
            tracing::debug!(url = %url, "No text to classify");
            false
        } else {
            match self.classifier.classify(text).await {
                Ok(verdict) => verdict,
                Err(e) => {
                    tracing::warn!(url = %url, outcome = %PageOutcome::ClassifyFailed, error = %e, "Classification failed");
                    return PageOutcome::ClassifyFailed;
                }
            }
        };

        tracing::info!(url = %url, relevant, "Classified");

        if !relevant {
            return PageOutcome::NotRelevant;
        }

        let key = StoreKey::for_url(url);
        match self.store.store_if_absent(&key, text).await {
            Ok(result) if result.written => {
                tracing::info!(url = %url, outcome = %PageOutcome::Stored, key = key.digest(), store = self.store.name(), "Stored");
                PageOutcome::Stored
            }
            Ok(_) => {
                tracing::info!(url = %url, outcome = %PageOutcome::AlreadyStored, key = key.digest(), "Already stored");
                PageOutcome::AlreadyStored
            }
            Err(e) => {
                tracing::error!(url = %url, outcome = %PageOutcome::StoreFailed, key = key.digest(), error = %e, "Store failed");
                PageOutcome::StoreFailed
            }
        }
    }
}
