//! HTTP client for a hosted classification agent
//!
//! Each call POSTs a JSON invocation to the configured endpoint:
//!
//! ```json
//! {"agentId": "...", "agentAliasId": "...", "region": "...",
//!  "sessionId": "...", "inputText": "<prompt>"}
//! ```
//!
//! and expects `{"completion": "<answer>"}` back.

use crate::classifier::{build_prompt, parse_verdict, Classifier};
use crate::config::ClassifierConfig;
use crate::ClassifyError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvokeRequest<'a> {
    agent_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    agent_alias_id: Option<&'a str>,
    region: &'a str,
    session_id: String,
    input_text: String,
}

#[derive(Debug, Deserialize)]
struct InvokeResponse {
    completion: String,
}

/// Classifier that delegates the verdict to a remote agent
pub struct AgentClassifier {
    client: Client,
    config: ClassifierConfig,
}

impl AgentClassifier {
    /// Creates a classifier for the configured endpoint
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint identity and topic
    /// * `timeout` - Timeout applied to each invocation
    pub fn new(config: ClassifierConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }
}

/// Every invocation runs in its own agent session
fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl Classifier for AgentClassifier {
    async fn classify(&self, text: &str) -> Result<bool, ClassifyError> {
        let request = InvokeRequest {
            agent_id: &self.config.agent_id,
            agent_alias_id: self.config.agent_alias_id.as_deref(),
            region: &self.config.region,
            session_id: new_session_id(),
            input_text: build_prompt(&self.config.topic, text, self.config.max_input_chars),
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClassifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifyError::Status(status.as_u16()));
        }

        let body: InvokeResponse = response
            .json()
            .await
            .map_err(|e| ClassifyError::Response(e.to_string()))?;

        tracing::debug!(completion = %body.completion.trim(), "Agent response");
        Ok(parse_verdict(&body.completion))
    }
}
