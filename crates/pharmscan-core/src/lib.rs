pub mod app_config;
pub mod config;
pub mod results;
pub mod sources;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use results::{CandidateResult, RawCandidate};
pub use sources::{default_sources, load_sources_file, SourceConfig, Sources};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON sources file: {0}")]
    SourcesFileJson(#[from] serde_json::Error),

    #[error("failed to parse YAML sources file: {0}")]
    SourcesFileYaml(#[from] serde_yaml::Error),

    #[error("sources validation error: {0}")]
    Validation(String),
}
