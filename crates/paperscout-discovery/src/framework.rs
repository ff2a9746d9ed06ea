use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use paperscout_core::DiscoveryConfig;
use paperscout_core::models::{
    DeduplicationDecision, DeduplicationStats, DiscoveryResult, Paper, PdfRecord, SourceStatistics,
};

use crate::collector::PdfCollector;
use crate::dedup::Deduplicator;
use crate::error::DiscoveryError;

type CollectorOutcome = (
    String,
    std::result::Result<HashMap<String, PdfRecord>, DiscoveryError>,
);

/// Coordinates registered collectors against a shared paper list and
/// produces one aggregated, deduplicated result per call.
///
/// All per-call state (record groupings, the failed-paper set) lives in
/// locals of `discover_pdfs`; the framework itself only owns the collector
/// list, the configuration, and the last call's audit log.
pub struct DiscoveryFramework {
    collectors: Vec<Arc<dyn PdfCollector>>,
    config: DiscoveryConfig,
    deduplicator: Deduplicator,
}

impl DiscoveryFramework {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self {
            collectors: Vec::new(),
            deduplicator: Deduplicator::from_config(&config),
            config,
        }
    }

    pub fn register_collector(&mut self, collector: Arc<dyn PdfCollector>) {
        self.collectors.push(collector);
    }

    /// Audit log of the most recent `discover_pdfs` call.
    pub fn deduplication_decisions(&self) -> &[DeduplicationDecision] {
        self.deduplicator.decisions()
    }

    /// Aggregate counts over the audit log.
    pub fn deduplication_stats(&self) -> DeduplicationStats {
        self.deduplicator.stats()
    }

    /// Run every registered collector against its assigned paper subset,
    /// deduplicate the combined discoveries, and report the outcome.
    ///
    /// Collector failures never propagate: they are logged, recorded in the
    /// per-source statistics, and the affected papers stay in
    /// `failed_papers` unless another collector found them.
    pub async fn discover_pdfs(&mut self, papers: &[Paper]) -> DiscoveryResult {
        let started = Instant::now();
        self.deduplicator.clear();

        if papers.is_empty() || self.collectors.is_empty() {
            let mut failed: Vec<String> = papers.iter().map(|p| p.id.clone()).collect();
            failed.sort();
            return DiscoveryResult::empty(failed, started.elapsed());
        }

        let paper_index: HashMap<String, Arc<Paper>> = papers
            .iter()
            .map(|paper| (paper.id.clone(), Arc::new(paper.clone())))
            .collect();
        let by_venue = group_papers_by_venue(papers);

        // Work subsets are computed once, before any collector runs; the
        // discovered set consulted here is always empty, so lower-priority
        // collectors still receive the full remainder.
        let discovered: HashSet<String> = HashSet::new();

        let mut stats: HashMap<String, SourceStatistics> = HashMap::new();
        let mut join_set: JoinSet<CollectorOutcome> = JoinSet::new();
        let mut task_names: HashMap<tokio::task::Id, String> = HashMap::new();

        for collector in &self.collectors {
            let name = collector.name().to_string();
            let subset = self.assign_papers(&name, papers, &by_venue, &discovered);
            if subset.is_empty() {
                debug!(source = %name, "no papers assigned, skipping collector");
                continue;
            }

            stats.insert(
                name.clone(),
                SourceStatistics {
                    papers_assigned: subset.len(),
                    ..Default::default()
                },
            );

            let task_collector = Arc::clone(collector);
            let task_name = name.clone();
            let handle = join_set.spawn(async move {
                let outcome = task_collector.discover_pdfs(&subset).await;
                (task_name, outcome)
            });
            task_names.insert(handle.id(), name);
        }

        // Aggregation happens only here, in completion order; in-flight
        // tasks never touch these maps.
        let mut records_by_paper: HashMap<String, Vec<PdfRecord>> = HashMap::new();
        let mut failed: HashSet<String> = papers.iter().map(|p| p.id.clone()).collect();

        while let Some(joined) = join_set.join_next_with_id().await {
            match joined {
                Ok((_, (name, Ok(found)))) => {
                    debug!(source = %name, records = found.len(), "collector finished");
                    stats.entry(name.clone()).or_default().records_found = found.len();

                    for (paper_id, mut record) in found {
                        let Some(paper) = paper_index.get(&paper_id) else {
                            warn!(
                                source = %name,
                                paper_id = %paper_id,
                                "collector returned a record for a paper outside the batch"
                            );
                            continue;
                        };
                        record.paper = Some(Arc::clone(paper));
                        failed.remove(&paper_id);
                        records_by_paper.entry(paper_id).or_default().push(record);
                    }
                }
                Ok((_, (name, Err(err)))) => {
                    warn!(source = %name, error = %err, "collector failed");
                    stats.entry(name).or_default().error = Some(err.to_string());
                }
                Err(join_err) => {
                    let name = task_names
                        .get(&join_err.id())
                        .cloned()
                        .unwrap_or_else(|| "unknown".to_string());
                    warn!(source = %name, error = %join_err, "collector task aborted");
                    stats.entry(name).or_default().error = Some(join_err.to_string());
                }
            }
        }

        let resolved = self.deduplicator.deduplicate(&records_by_paper);

        let mut records: Vec<PdfRecord> = resolved.into_values().collect();
        records.sort_by(|a, b| a.paper_id.cmp(&b.paper_id));
        let mut failed_papers: Vec<String> = failed.into_iter().collect();
        failed_papers.sort();

        info!(
            total = papers.len(),
            discovered = records.len(),
            failed = failed_papers.len(),
            "discovery finished"
        );

        DiscoveryResult {
            total_papers: papers.len(),
            discovered_count: records.len(),
            records,
            failed_papers,
            source_statistics: stats,
            execution_time: started.elapsed(),
        }
    }

    /// Subset of `papers` a collector should chase: the full paper set of
    /// every venue that names it as top-priority source, plus all papers
    /// not yet in `discovered`.
    fn assign_papers(
        &self,
        collector_name: &str,
        papers: &[Paper],
        by_venue: &HashMap<String, Vec<usize>>,
        discovered: &HashSet<String>,
    ) -> Vec<Paper> {
        if self.config.venue_priorities.is_empty() {
            return papers
                .iter()
                .filter(|paper| !discovered.contains(&paper.id))
                .cloned()
                .collect();
        }

        let mut assigned = Vec::new();
        let mut taken: HashSet<&str> = HashSet::new();

        let mut venues: Vec<&String> = by_venue.keys().collect();
        venues.sort();
        for venue in venues {
            let is_top_priority = self
                .config
                .venue_preference(venue)
                .and_then(|sources| sources.first())
                .is_some_and(|top| top == collector_name);
            if !is_top_priority {
                continue;
            }
            for &idx in &by_venue[venue] {
                assigned.push(papers[idx].clone());
                taken.insert(papers[idx].id.as_str());
            }
        }

        for paper in papers {
            if !taken.contains(paper.id.as_str()) && !discovered.contains(&paper.id) {
                assigned.push(paper.clone());
            }
        }

        assigned
    }
}

fn group_papers_by_venue(papers: &[Paper]) -> HashMap<String, Vec<usize>> {
    let mut by_venue: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, paper) in papers.iter().enumerate() {
        by_venue.entry(paper.venue.clone()).or_default().push(idx);
    }
    by_venue
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue_paper(id: &str, venue: &str) -> Paper {
        Paper::new(id, format!("Paper {id}"), venue)
    }

    fn framework_with_priorities() -> DiscoveryFramework {
        let mut config = DiscoveryConfig::default();
        config.venue_priorities.insert(
            "NeurIPS".to_string(),
            vec!["venue_direct".to_string(), "arxiv".to_string()],
        );
        DiscoveryFramework::new(config)
    }

    #[test]
    fn assignment_without_priorities_filters_discovered() {
        let framework = DiscoveryFramework::new(DiscoveryConfig::default());
        let papers = vec![venue_paper("a", "NeurIPS"), venue_paper("b", "ICML")];
        let by_venue = group_papers_by_venue(&papers);

        let discovered: HashSet<String> = ["a".to_string()].into();
        let assigned = framework.assign_papers("arxiv", &papers, &by_venue, &discovered);

        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].id, "b");
    }

    #[test]
    fn top_priority_collector_keeps_its_venue_despite_discovered() {
        let framework = framework_with_priorities();
        let papers = vec![venue_paper("a", "NeurIPS"), venue_paper("b", "ICML")];
        let by_venue = group_papers_by_venue(&papers);

        // "a" was already discovered, but venue_direct is top priority for
        // NeurIPS and still receives that venue's full set.
        let discovered: HashSet<String> = ["a".to_string()].into();
        let assigned = framework.assign_papers("venue_direct", &papers, &by_venue, &discovered);
        let ids: Vec<&str> = assigned.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        // arxiv is not top priority for NeurIPS, so the discovered paper is
        // filtered out of its share.
        let assigned = framework.assign_papers("arxiv", &papers, &by_venue, &discovered);
        let ids: Vec<&str> = assigned.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn assignment_before_any_discovery_covers_every_paper() {
        let framework = framework_with_priorities();
        let papers = vec![venue_paper("a", "NeurIPS"), venue_paper("b", "ICML")];
        let by_venue = group_papers_by_venue(&papers);

        // The discovered set is empty at subset-computation time, so every
        // collector receives every paper.
        let discovered = HashSet::new();
        for name in ["venue_direct", "arxiv", "semantic_scholar"] {
            let assigned = framework.assign_papers(name, &papers, &by_venue, &discovered);
            assert_eq!(assigned.len(), 2, "collector {name}");
        }
    }
}
