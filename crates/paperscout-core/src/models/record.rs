use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::paper::Paper;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    Invalid,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub is_published: bool,

    #[serde(default)]
    pub is_preprint: bool,
}

/// One collector's claim that `pdf_url` is the PDF for `paper_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfRecord {
    /// Record identity, used by the matchers and the audit log.
    pub id: Uuid,

    pub paper_id: String,

    pub pdf_url: String,

    /// Name of the collector that produced this record.
    pub source: String,

    pub discovered_at: DateTime<Utc>,

    /// Collector-assigned confidence, clamped to 0.0–1.0.
    pub confidence: f64,

    #[serde(default)]
    pub version_info: VersionInfo,

    #[serde(default)]
    pub validation_status: ValidationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,

    /// Read-only back-reference to the paper this record claims to
    /// describe. Attached by the framework; records still missing it when
    /// deduplication runs are dropped.
    #[serde(skip)]
    pub paper: Option<Arc<Paper>>,
}

impl PdfRecord {
    pub fn new(
        paper_id: impl Into<String>,
        pdf_url: impl Into<String>,
        source: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            paper_id: paper_id.into(),
            pdf_url: pdf_url.into(),
            source: source.into(),
            discovered_at: Utc::now(),
            confidence: confidence.clamp(0.0, 1.0),
            version_info: VersionInfo::default(),
            validation_status: ValidationStatus::Unknown,
            file_size_bytes: None,
            paper: None,
        }
    }

    pub fn with_paper(mut self, paper: Arc<Paper>) -> Self {
        self.paper = Some(paper);
        self
    }
}
