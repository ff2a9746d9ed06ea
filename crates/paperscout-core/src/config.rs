use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Discovery pipeline configuration, loadable from a TOML file.
///
/// Every field has a default, so a partial file (or none at all) yields a
/// working configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Prefer published versions over preprints during version selection.
    pub prefer_published: bool,

    /// Minimum title similarity before a pair is considered for a fuzzy
    /// match. Pairs below this never reach author comparison.
    pub title_threshold: f64,

    /// Minimum author-list similarity for a fuzzy match.
    pub author_threshold: f64,

    /// Hard ceiling on the record count fed to pairwise fuzzy matching.
    /// Above it, fuzzy matching is skipped for the whole batch.
    pub max_fuzzy_records: usize,

    /// Ranking used by version selection. Unknown sources fall back to
    /// the `other` entry.
    pub source_priorities: HashMap<String, u32>,

    /// Venue name (or `"default"`) to ordered source names. The first
    /// entry is the top-priority collector for that venue.
    #[serde(default)]
    pub venue_priorities: HashMap<String, Vec<String>>,
}

impl DiscoveryConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Priority rank for a source name, falling back to `other`.
    pub fn priority_for(&self, source: &str) -> u32 {
        self.source_priorities
            .get(source)
            .or_else(|| self.source_priorities.get("other"))
            .copied()
            .unwrap_or(1)
    }

    /// Highest configured priority, used to scale priority scores.
    pub fn max_priority(&self) -> u32 {
        self.source_priorities.values().copied().max().unwrap_or(1)
    }

    /// Ordered source preference for a venue, falling back to the
    /// `"default"` entry.
    pub fn venue_preference(&self, venue: &str) -> Option<&[String]> {
        self.venue_priorities
            .get(venue)
            .or_else(|| self.venue_priorities.get("default"))
            .map(Vec::as_slice)
    }
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            prefer_published: true,
            title_threshold: 0.95,
            author_threshold: 0.85,
            max_fuzzy_records: 5000,
            source_priorities: default_source_priorities(),
            venue_priorities: HashMap::new(),
        }
    }
}

fn default_source_priorities() -> HashMap<String, u32> {
    [
        ("venue_direct", 10),
        ("semantic_scholar", 8),
        ("openalex", 7),
        ("arxiv", 5),
        ("repository", 3),
        ("other", 1),
    ]
    .into_iter()
    .map(|(name, rank)| (name.to_string(), rank))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = DiscoveryConfig::default();
        assert!(config.prefer_published);
        assert_eq!(config.title_threshold, 0.95);
        assert_eq!(config.author_threshold, 0.85);
        assert_eq!(config.max_fuzzy_records, 5000);
        assert_eq!(config.priority_for("venue_direct"), 10);
        assert_eq!(config.priority_for("semantic_scholar"), 8);
        assert_eq!(config.max_priority(), 10);
    }

    #[test]
    fn unknown_source_falls_back_to_other() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.priority_for("sci-hub-mirror-7"), 1);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: DiscoveryConfig = toml::from_str("title_threshold = 0.9").unwrap();
        assert_eq!(config.title_threshold, 0.9);
        assert_eq!(config.author_threshold, 0.85);
        assert_eq!(config.priority_for("arxiv"), 5);
    }

    #[test]
    fn toml_roundtrip_via_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("discovery.toml");

        let mut config = DiscoveryConfig::default();
        config.venue_priorities.insert(
            "NeurIPS".to_string(),
            vec!["venue_direct".to_string(), "arxiv".to_string()],
        );
        config.save(&path).unwrap();

        let loaded = DiscoveryConfig::load(&path).unwrap();
        assert_eq!(loaded.title_threshold, config.title_threshold);
        assert_eq!(
            loaded.venue_preference("NeurIPS").unwrap()[0],
            "venue_direct"
        );
        assert!(loaded.venue_preference("ICML").is_none());
    }

    #[test]
    fn default_entry_covers_unlisted_venues() {
        let mut config = DiscoveryConfig::default();
        config
            .venue_priorities
            .insert("default".to_string(), vec!["semantic_scholar".to_string()]);
        assert_eq!(
            config.venue_preference("ICML").unwrap()[0],
            "semantic_scholar"
        );
    }
}
