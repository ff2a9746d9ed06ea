use std::collections::HashMap;

use async_trait::async_trait;

use paperscout_core::models::{Paper, PdfRecord};

use crate::error::Result;

/// A source-specific PDF discoverer, the unit of concurrency and of
/// failure isolation.
///
/// Implementations must not fail for individual-paper misses: return what
/// was found and omit the rest. A wholesale failure (network down, auth
/// rejected) may be returned as an error; the framework logs it and keeps
/// the other collectors running.
#[async_trait]
pub trait PdfCollector: Send + Sync {
    /// Stable source name. Also the key used by source priorities and
    /// per-source statistics.
    fn name(&self) -> &str;

    /// Discover candidate PDFs for `papers`, keyed by paper id, with at
    /// most one record per paper.
    async fn discover_pdfs(&self, papers: &[Paper]) -> Result<HashMap<String, PdfRecord>>;
}
