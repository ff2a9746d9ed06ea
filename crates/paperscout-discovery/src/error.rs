use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("invalid DOI: {0}")]
    InvalidDoi(String),

    #[error("invalid arXiv ID: {0}")]
    InvalidArxivId(String),

    #[error("collector {source} failed: {message}")]
    Collector { source: String, message: String },

    #[error("cannot select a version from an empty record list")]
    EmptySelection,
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
