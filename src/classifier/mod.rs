//! Topic classification
//!
//! The crawler asks a classifier one question per page: is this text about
//! the configured topic? The production backend is a remote agent reached
//! over HTTP; tests substitute their own implementations of [`Classifier`].

mod agent;

pub use agent::AgentClassifier;

use crate::ClassifyError;
use async_trait::async_trait;

/// Trait for relevance classifiers
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Returns true if `text` is about the classifier's topic
    async fn classify(&self, text: &str) -> Result<bool, ClassifyError>;
}

/// Builds the yes/no question sent to the agent
///
/// Text longer than `max_chars` characters is cut on a character boundary.
pub fn build_prompt(topic: &str, text: &str, max_chars: usize) -> String {
    let content = truncate_chars(text, max_chars);
    format!(
        "You are a classifier. Given the following web page content, \
         answer only 'yes' if it is about {topic}, otherwise answer 'no'.\n\n\
         Content:\n{content}\n\nIs this about {topic}?"
    )
}

/// Interprets an agent completion as a verdict
///
/// Only an answer that starts with "yes" (ignoring case and surrounding
/// whitespace) counts as relevant. Anything else, including an empty
/// completion, is a "no".
pub fn parse_verdict(completion: &str) -> bool {
    completion.trim().to_lowercase().starts_with("yes")
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
