use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Path to the sources document (JSON, or YAML by extension).
    pub sources_path: PathBuf,
    pub request_timeout_secs: u64,
    /// Additional attempts after the first failed request to a source.
    pub max_retries: u32,
    /// Linear backoff unit: the wait before retry `n` is `n * retry_base_delay_ms`.
    pub retry_base_delay_ms: u64,
    pub cache_ttl_secs: u64,
    /// Upper bound on concurrently running per-source tasks.
    pub max_concurrent_sources: usize,
}
