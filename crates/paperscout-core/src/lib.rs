//! paperscout core — data model, configuration, and errors shared by the
//! discovery pipeline.

pub mod config;
pub mod error;
pub mod models;

pub use config::DiscoveryConfig;
pub use error::{CoreError, Result};
pub use models::*;
