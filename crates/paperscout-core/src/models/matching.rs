use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier field that produced an exact match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    Doi,
    ArxivId,
    PaperId,
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Doi => "doi",
            Self::ArxivId => "arxiv_id",
            Self::PaperId => "paper_id",
        };
        write!(f, "{name}")
    }
}

/// Records tied together by a shared normalized identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExactMatch {
    pub record_ids: Vec<Uuid>,
    pub field: MatchField,
    pub value: String,
    pub confidence: f64,
}

impl ExactMatch {
    pub fn new(record_ids: Vec<Uuid>, field: MatchField, value: impl Into<String>) -> Self {
        Self {
            record_ids,
            field,
            value: value.into(),
            confidence: 1.0,
        }
    }
}

/// A pair of records judged similar enough on content alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzyMatch {
    pub record_ids: Vec<Uuid>,
    pub title_similarity: f64,
    pub author_similarity: f64,
    pub venue_year_match: bool,
}

impl FuzzyMatch {
    /// Derived confidence: weighted title/author blend, boosted when the
    /// venue and year agree, capped at 1.0.
    pub fn confidence(&self) -> f64 {
        let base = 0.6 * self.title_similarity + 0.4 * self.author_similarity;
        if self.venue_year_match {
            (base * 1.1).min(1.0)
        } else {
            base
        }
    }
}

/// One entry of the append-only deduplication audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeduplicationDecision {
    pub merged_records: Vec<Uuid>,
    pub selected_record: Uuid,
    pub reason: String,
    pub confidence: f64,
    pub decided_at: DateTime<Utc>,
}

/// Aggregate view of the audit log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeduplicationStats {
    pub total_decisions: usize,
    pub merge_decisions: usize,
    pub average_confidence: f64,
    pub merge_rate: f64,
}

impl DeduplicationStats {
    pub fn from_decisions(decisions: &[DeduplicationDecision]) -> Self {
        if decisions.is_empty() {
            return Self::default();
        }

        let total = decisions.len();
        let merges = decisions
            .iter()
            .filter(|d| d.merged_records.len() > 1)
            .count();
        let confidence_sum: f64 = decisions.iter().map(|d| d.confidence).sum();

        Self {
            total_decisions: total,
            merge_decisions: merges,
            average_confidence: confidence_sum / total as f64,
            merge_rate: merges as f64 / total as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fuzzy(title: f64, author: f64, venue_year: bool) -> FuzzyMatch {
        FuzzyMatch {
            record_ids: vec![Uuid::new_v4(), Uuid::new_v4()],
            title_similarity: title,
            author_similarity: author,
            venue_year_match: venue_year,
        }
    }

    #[test]
    fn fuzzy_confidence_blends_title_and_authors() {
        let m = fuzzy(1.0, 0.5, false);
        assert!((m.confidence() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn venue_year_boost_is_capped() {
        let boosted = fuzzy(0.8, 0.8, true);
        assert!((boosted.confidence() - 0.88).abs() < 1e-9);

        let capped = fuzzy(1.0, 1.0, true);
        assert_eq!(capped.confidence(), 1.0);
    }

    #[test]
    fn match_field_display_names() {
        assert_eq!(MatchField::Doi.to_string(), "doi");
        assert_eq!(MatchField::ArxivId.to_string(), "arxiv_id");
        assert_eq!(MatchField::PaperId.to_string(), "paper_id");
    }

    #[test]
    fn stats_over_empty_log_are_zero() {
        let stats = DeduplicationStats::from_decisions(&[]);
        assert_eq!(stats.total_decisions, 0);
        assert_eq!(stats.merge_rate, 0.0);
    }

    #[test]
    fn stats_count_merges_and_average() {
        let merged = DeduplicationDecision {
            merged_records: vec![Uuid::new_v4(), Uuid::new_v4()],
            selected_record: Uuid::new_v4(),
            reason: "exact_match_doi:10.1/x".to_string(),
            confidence: 0.9,
            decided_at: Utc::now(),
        };
        let single = DeduplicationDecision {
            merged_records: vec![Uuid::new_v4()],
            selected_record: Uuid::new_v4(),
            reason: "version_selection".to_string(),
            confidence: 0.5,
            decided_at: Utc::now(),
        };

        let stats = DeduplicationStats::from_decisions(&[merged, single]);
        assert_eq!(stats.total_decisions, 2);
        assert_eq!(stats.merge_decisions, 1);
        assert!((stats.average_confidence - 0.7).abs() < 1e-9);
        assert!((stats.merge_rate - 0.5).abs() < 1e-9);
    }
}
