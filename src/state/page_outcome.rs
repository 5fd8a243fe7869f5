/// Page outcome definitions for the crawl decision trace
///
/// Every URL popped from the frontier ends in exactly one of these outcomes.
use std::fmt;

/// Represents how the crawl loop finished handling one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageOutcome {
    // ===== Classified States =====
    /// Page was relevant and its text was written to the store
    Stored,

    /// Page was relevant but the store already held its key
    AlreadyStored,

    /// Page was classified as off-topic
    NotRelevant,

    // ===== Recoverable Pipeline Failures =====
    /// Classifier call failed; treated as not relevant
    ClassifyFailed,

    /// Page was relevant but the store write failed
    StoreFailed,

    // ===== Fetch Failures =====
    /// Server answered with a non-2xx status
    HttpError,

    /// Network failure, timeout, or unreadable body
    FetchFailed,

    /// Response was not HTML
    NotHtml,

    /// Redirects led off the crawl's host
    OffScopeRedirect,

    /// Redirects ended on a page that was already visited
    DuplicateRedirect,
}

impl PageOutcome {
    /// Returns true if the page was fetched and its links were followed
    pub fn is_processed(&self) -> bool {
        matches!(
            self,
            Self::Stored
                | Self::AlreadyStored
                | Self::NotRelevant
                | Self::ClassifyFailed
                | Self::StoreFailed
        )
    }

    /// Returns true if the classifier judged the page on-topic
    pub fn is_relevant(&self) -> bool {
        matches!(self, Self::Stored | Self::AlreadyStored | Self::StoreFailed)
    }

    /// Returns true if this outcome was caused by a collaborator failure
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ClassifyFailed | Self::StoreFailed | Self::HttpError | Self::FetchFailed
        )
    }

    /// Returns true if the page was never fetched successfully
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::HttpError
                | Self::FetchFailed
                | Self::NotHtml
                | Self::OffScopeRedirect
                | Self::DuplicateRedirect
        )
    }

    /// Stable snake_case name used in log fields and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::AlreadyStored => "already_stored",
            Self::NotRelevant => "not_relevant",
            Self::ClassifyFailed => "classify_failed",
            Self::StoreFailed => "store_failed",
            Self::HttpError => "http_error",
            Self::FetchFailed => "fetch_failed",
            Self::NotHtml => "not_html",
            Self::OffScopeRedirect => "off_scope_redirect",
            Self::DuplicateRedirect => "duplicate_redirect",
        }
    }

    /// Returns all possible outcomes, in report order
    pub fn all() -> [Self; 10] {
        [
            Self::Stored,
            Self::AlreadyStored,
            Self::NotRelevant,
            Self::ClassifyFailed,
            Self::StoreFailed,
            Self::HttpError,
            Self::FetchFailed,
            Self::NotHtml,
            Self::OffScopeRedirect,
            Self::DuplicateRedirect,
        ]
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
