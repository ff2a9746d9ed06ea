use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::record::PdfRecord;

/// Per-collector counters for one discovery call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceStatistics {
    /// Papers handed to the collector.
    pub papers_assigned: usize,

    /// Records the collector returned.
    pub records_found: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceStatistics {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregated outcome of one `discover_pdfs` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub total_papers: usize,

    /// Number of unique papers with a surviving record.
    pub discovered_count: usize,

    /// One record per resolved unique paper.
    pub records: Vec<PdfRecord>,

    /// Paper ids never returned by any collector, sorted.
    pub failed_papers: Vec<String>,

    pub source_statistics: HashMap<String, SourceStatistics>,

    pub execution_time: Duration,
}

impl DiscoveryResult {
    /// Result for a call that could not dispatch any work: everything
    /// failed, nothing discovered.
    pub fn empty(paper_ids: Vec<String>, execution_time: Duration) -> Self {
        Self {
            total_papers: paper_ids.len(),
            discovered_count: 0,
            records: Vec::new(),
            failed_papers: paper_ids,
            source_statistics: HashMap::new(),
            execution_time,
        }
    }
}
