use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Main configuration structure for Topic-Sieve
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub request: RequestConfig,
    pub store: StoreConfig,
    pub classifier: ClassifierConfig,
}

/// Crawl loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Absolute http(s) URL the crawl starts from; its host is the crawl scope
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Maximum number of pages to process in one run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Pause between successive fetches (milliseconds)
    #[serde(rename = "politeness-delay-ms", default = "default_politeness_delay")]
    pub politeness_delay_ms: u64,

    /// Number of concurrent crawl workers; 1 keeps strict FIFO order
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Optional wall-clock limit for the whole run (seconds)
    #[serde(rename = "max-run-seconds", default)]
    pub max_run_seconds: Option<u64>,
}

impl CrawlConfig {
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }

    pub fn run_deadline(&self) -> Option<Duration> {
        self.max_run_seconds.map(Duration::from_secs)
    }
}

/// Outgoing request configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    /// User-Agent header sent with every fetch
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_timeout")]
    pub timeout_ms: u64,

    /// Extra headers sent with every fetch
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl RequestConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_ms: default_timeout(),
            headers: BTreeMap::new(),
        }
    }
}

/// Which content store implementation to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    /// One file per page below a root directory
    Directory,
    /// One row per page in a SQLite database file
    Sqlite,
    /// In-process map, discarded when the run ends
    Memory,
}

/// Content store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// Directory root or database file, depending on the backend
    #[serde(default)]
    pub location: String,

    /// Prefix prepended to every object key
    #[serde(default)]
    pub prefix: String,
}

/// Classifier endpoint identity
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// URL the classification requests are POSTed to
    pub endpoint: String,

    /// Agent (or model) identifier
    #[serde(rename = "agent-id")]
    pub agent_id: String,

    /// Agent alias identifier
    #[serde(rename = "agent-alias-id", default)]
    pub agent_alias_id: Option<String>,

    /// Region the agent lives in
    pub region: String,

    /// Topic pages are judged against, e.g. "mutual funds"
    pub topic: String,

    /// Page text beyond this many characters is not sent
    #[serde(rename = "max-input-chars", default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

fn default_max_pages() -> usize {
    50
}

fn default_politeness_delay() -> u64 {
    1000
}

fn default_workers() -> usize {
    1
}

fn default_user_agent() -> String {
    format!("topic-sieve/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    10_000
}

fn default_backend() -> StoreBackend {
    StoreBackend::Directory
}

fn default_max_input_chars() -> usize {
    20_000
}
