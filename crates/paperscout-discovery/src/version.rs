use std::collections::HashMap;

use tracing::debug;

use paperscout_core::DiscoveryConfig;
use paperscout_core::models::{PdfRecord, ValidationStatus};

use crate::error::{DiscoveryError, Result};

/// Scores become hard to tell apart below this margin; such decisions are
/// logged for observability but resolved normally.
const CLOSE_SCORE_MARGIN: f64 = 0.1;

/// Deterministic best-version selection among confirmed duplicates.
#[derive(Debug, Clone)]
pub struct VersionManager {
    prefer_published: bool,
    source_priorities: HashMap<String, u32>,
    max_priority: u32,
}

impl Default for VersionManager {
    fn default() -> Self {
        Self::from_config(&DiscoveryConfig::default())
    }
}

impl VersionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self {
            prefer_published: config.prefer_published,
            source_priorities: config.source_priorities.clone(),
            max_priority: config.max_priority(),
        }
    }

    /// Additive 0–100 score, independent of input order.
    pub fn score(&self, record: &PdfRecord) -> f64 {
        let mut score = 0.0;

        score += match record.validation_status {
            ValidationStatus::Valid => 20.0,
            ValidationStatus::Unknown => 10.0,
            ValidationStatus::Invalid => 0.0,
        };

        if self.prefer_published {
            if record.version_info.is_published {
                score += 20.0;
            } else if record.version_info.is_preprint {
                score += 5.0;
            }
        }

        let priority = self
            .source_priorities
            .get(&record.source)
            .or_else(|| self.source_priorities.get("other"))
            .copied()
            .unwrap_or(1);
        score += f64::from(priority) / f64::from(self.max_priority.max(1)) * 30.0;

        score += record.confidence * 20.0;

        if let Some(size) = record.file_size_bytes {
            if size > 100_000 {
                score += 10.0;
            } else if size > 50_000 {
                score += 5.0;
            }
        }

        score
    }

    /// Pick the highest-scoring record; ties go to the first seen, so
    /// repeated runs over the same input select the same record.
    ///
    /// An empty list is a caller bug and the one condition that errors.
    pub fn select_best_version<'a>(&self, records: &'a [PdfRecord]) -> Result<&'a PdfRecord> {
        let first = records.first().ok_or(DiscoveryError::EmptySelection)?;

        let mut best = first;
        let mut best_score = self.score(first);
        let mut runner_up_score = f64::NEG_INFINITY;

        for record in &records[1..] {
            let score = self.score(record);
            if score > best_score {
                runner_up_score = best_score;
                best = record;
                best_score = score;
            } else if score > runner_up_score {
                runner_up_score = score;
            }
        }

        if records.len() > 1 && best_score - runner_up_score < CLOSE_SCORE_MARGIN {
            debug!(
                selected = %best.id,
                source = %best.source,
                best_score,
                runner_up_score,
                "close version-selection decision"
            );
        }

        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use paperscout_core::models::{Paper, VersionInfo};

    use super::*;

    fn record(source: &str, confidence: f64) -> PdfRecord {
        PdfRecord::new("p1", "https://example.org/x.pdf", source, confidence)
            .with_paper(Arc::new(Paper::new("p1", "A Title", "NeurIPS")))
    }

    #[test]
    fn scoring_matches_worked_example() {
        let manager = VersionManager::new();

        // unknown validation, no flags, priority 5/10, confidence 0.7
        let arxiv = record("arxiv", 0.7);
        assert!((manager.score(&arxiv) - 39.0).abs() < 1e-9);

        // valid, no flags, priority 8/10, confidence 0.9, large file
        let mut s2 = record("semantic_scholar", 0.9);
        s2.validation_status = ValidationStatus::Valid;
        s2.file_size_bytes = Some(200_000);
        assert!((manager.score(&s2) - 72.0).abs() < 1e-9);

        let records = vec![arxiv, s2];
        let best = manager.select_best_version(&records).unwrap();
        assert_eq!(best.source, "semantic_scholar");
    }

    #[test]
    fn published_preference_only_when_enabled() {
        let published = {
            let mut r = record("arxiv", 0.5);
            r.version_info = VersionInfo {
                is_published: true,
                is_preprint: false,
            };
            r
        };

        let enabled = VersionManager::new();
        let mut config = DiscoveryConfig::default();
        config.prefer_published = false;
        let disabled = VersionManager::from_config(&config);

        assert!((enabled.score(&published) - disabled.score(&published) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn preprint_flag_scores_less_than_published() {
        let manager = VersionManager::new();
        let mut preprint = record("arxiv", 0.5);
        preprint.version_info = VersionInfo {
            is_published: false,
            is_preprint: true,
        };
        let mut published = record("arxiv", 0.5);
        published.version_info = VersionInfo {
            is_published: true,
            is_preprint: false,
        };
        assert!((manager.score(&published) - manager.score(&preprint) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn midsize_file_gets_smaller_bonus() {
        let manager = VersionManager::new();
        let small = record("arxiv", 0.5);
        let mut mid = record("arxiv", 0.5);
        mid.file_size_bytes = Some(60_000);
        let mut large = record("arxiv", 0.5);
        large.file_size_bytes = Some(200_000);

        assert!((manager.score(&mid) - manager.score(&small) - 5.0).abs() < 1e-9);
        assert!((manager.score(&large) - manager.score(&small) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn selection_is_deterministic_under_reordering() {
        let manager = VersionManager::new();

        let mut winner = record("semantic_scholar", 0.9);
        winner.validation_status = ValidationStatus::Valid;
        let loser = record("arxiv", 0.7);

        let forward = vec![loser.clone(), winner.clone()];
        let backward = vec![winner.clone(), loser];

        assert_eq!(
            manager.select_best_version(&forward).unwrap().id,
            winner.id
        );
        assert_eq!(
            manager.select_best_version(&backward).unwrap().id,
            winner.id
        );
    }

    #[test]
    fn ties_resolve_to_first_seen() {
        let manager = VersionManager::new();
        let first = record("arxiv", 0.7);
        let second = record("arxiv", 0.7);

        let records = vec![first.clone(), second];
        assert_eq!(manager.select_best_version(&records).unwrap().id, first.id);
    }

    #[test]
    fn empty_list_is_an_error() {
        let manager = VersionManager::new();
        assert!(matches!(
            manager.select_best_version(&[]),
            Err(DiscoveryError::EmptySelection)
        ));
    }
}
