use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use paperscout_core::DiscoveryConfig;
use paperscout_core::models::{DeduplicationDecision, DeduplicationStats, PdfRecord};

use crate::error::Result;
use crate::matcher::FuzzyMatcher;
use crate::version::VersionManager;

/// Reduces the records discovered for a batch of papers to exactly one
/// record per real-world paper, keeping an audit log of every merge.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    matcher: FuzzyMatcher,
    version_manager: VersionManager,
    decisions: Vec<DeduplicationDecision>,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::from_config(&DiscoveryConfig::default())
    }
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self {
            matcher: FuzzyMatcher::from_config(config),
            version_manager: VersionManager::from_config(config),
            decisions: Vec::new(),
        }
    }

    /// Append-only audit log for the most recent run.
    pub fn decisions(&self) -> &[DeduplicationDecision] {
        &self.decisions
    }

    pub fn stats(&self) -> DeduplicationStats {
        DeduplicationStats::from_decisions(&self.decisions)
    }

    pub fn clear(&mut self) {
        self.decisions.clear();
    }

    /// Resolve the per-paper record groups to one record per unique paper,
    /// keyed by the surviving record's paper id.
    ///
    /// Never fails: an internal matching error downgrades to the naive
    /// first-record-per-group strategy.
    pub fn deduplicate(
        &mut self,
        records_by_paper: &HashMap<String, Vec<PdfRecord>>,
    ) -> HashMap<String, PdfRecord> {
        // Paper-group keys are visited in sorted order so grouping and
        // tie-breaking are stable across runs.
        let mut keys: Vec<&String> = records_by_paper.keys().collect();
        keys.sort();

        let mut flat: Vec<PdfRecord> = Vec::new();
        for key in keys {
            for record in &records_by_paper[key] {
                if record.paper.is_none() {
                    warn!(
                        record = %record.id,
                        paper_id = %record.paper_id,
                        source = %record.source,
                        "dropping record without paper reference"
                    );
                    continue;
                }
                flat.push(record.clone());
            }
        }

        match self.resolve_groups(&flat) {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(error = %err, "deduplication failed, keeping first record per paper");
                fallback_first_record(records_by_paper)
            }
        }
    }

    fn resolve_groups(&mut self, records: &[PdfRecord]) -> Result<HashMap<String, PdfRecord>> {
        let exact = self.matcher.find_duplicates_exact(records);
        let fuzzy = self.matcher.find_duplicates_fuzzy(records);

        let by_id: HashMap<Uuid, &PdfRecord> = records.iter().map(|r| (r.id, r)).collect();
        let mut grouped: HashSet<Uuid> = HashSet::new();
        let mut groups: Vec<(Vec<&PdfRecord>, Option<String>)> = Vec::new();

        // Exact matches claim their records first; fuzzy matches only get
        // what identifiers could not already tie together.
        for m in &exact {
            if m.record_ids.iter().any(|id| grouped.contains(id)) {
                continue;
            }
            let members: Vec<&PdfRecord> = m
                .record_ids
                .iter()
                .filter_map(|id| by_id.get(id).copied())
                .collect();
            if members.len() < 2 {
                continue;
            }
            grouped.extend(m.record_ids.iter().copied());
            groups.push((members, Some(format!("exact_match_{}:{}", m.field, m.value))));
        }

        for m in &fuzzy {
            if m.record_ids.iter().any(|id| grouped.contains(id)) {
                continue;
            }
            let members: Vec<&PdfRecord> = m
                .record_ids
                .iter()
                .filter_map(|id| by_id.get(id).copied())
                .collect();
            if members.len() < 2 {
                continue;
            }
            grouped.extend(m.record_ids.iter().copied());
            groups.push((
                members,
                Some(format!("fuzzy_match_confidence:{:.3}", m.confidence())),
            ));
        }

        for record in records {
            if !grouped.contains(&record.id) {
                groups.push((vec![record], None));
            }
        }

        let mut resolved: HashMap<String, PdfRecord> = HashMap::new();
        for (members, reason) in groups {
            if members.len() == 1 {
                let only = members[0];
                resolved.insert(only.paper_id.clone(), only.clone());
                continue;
            }

            let candidates: Vec<PdfRecord> = members.iter().map(|r| (*r).clone()).collect();
            let best = self.version_manager.select_best_version(&candidates)?.clone();

            self.decisions.push(DeduplicationDecision {
                merged_records: members.iter().map(|r| r.id).collect(),
                selected_record: best.id,
                reason: reason.unwrap_or_else(|| "version_selection".to_string()),
                confidence: best.confidence,
                decided_at: Utc::now(),
            });

            resolved.insert(best.paper_id.clone(), best);
        }

        Ok(resolved)
    }
}

/// Naive strategy used when matching itself fails: the first record of
/// each original paper-group survives.
fn fallback_first_record(
    records_by_paper: &HashMap<String, Vec<PdfRecord>>,
) -> HashMap<String, PdfRecord> {
    records_by_paper
        .iter()
        .filter_map(|(paper_id, records)| {
            records.first().map(|first| (paper_id.clone(), first.clone()))
        })
        .collect()
}
