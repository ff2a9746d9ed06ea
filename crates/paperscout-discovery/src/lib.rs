//! paperscout discovery — DOI/arXiv normalization, duplicate matching,
//! version selection, and the parallel collector framework.

pub mod collector;
pub mod dedup;
pub mod error;
pub mod framework;
pub mod identifiers;
pub mod matcher;
pub mod version;

pub use collector::PdfCollector;
pub use dedup::Deduplicator;
pub use error::{DiscoveryError, Result};
pub use framework::DiscoveryFramework;
pub use matcher::FuzzyMatcher;
pub use version::VersionManager;
