use std::collections::HashMap;

use once_cell::sync::Lazy;
use rapidfuzz::fuzz;
use regex::Regex;
use tracing::warn;

use paperscout_core::DiscoveryConfig;
use paperscout_core::models::{Author, ExactMatch, FuzzyMatch, MatchField, Paper, PdfRecord};

use crate::identifiers::{ArxivId, Doi};

// Qualifier suffixes that venues append to otherwise-identical titles.
static QUALIFIER_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\s*\((extended abstract|short paper|poster|demo|supplementary material|appendix)\)\s*$",
    )
    .unwrap()
});

static SUPPLEMENT_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*[-:]\s*supplementary.*$").unwrap());

// "x." initials become "x " so "J. Smith" and "J Smith" align.
static INITIAL_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([a-z])\.").unwrap());

/// Content-similarity matching over discovered records, used when
/// identifier-based exact matching is unavailable or insufficient.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    title_threshold: f64,
    author_threshold: f64,
    max_fuzzy_records: usize,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            title_threshold: 0.95,
            author_threshold: 0.85,
            max_fuzzy_records: 5000,
        }
    }
}

impl FuzzyMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self {
            title_threshold: config.title_threshold,
            author_threshold: config.author_threshold,
            max_fuzzy_records: config.max_fuzzy_records,
        }
    }

    // ─── Title similarity ─────────────────────────────────────────

    pub fn normalize_title(title: &str) -> String {
        let mut current = title.to_lowercase();
        loop {
            let stripped = QUALIFIER_SUFFIX.replace(&current, "");
            let stripped = SUPPLEMENT_TAIL.replace(&stripped, "");
            if stripped == current {
                break;
            }
            current = stripped.into_owned();
        }
        current.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Weighted blend of token-sort, token-set, and partial ratios on
    /// normalized titles, each scaled to [0,1]. Symmetric.
    pub fn title_similarity(a: &str, b: &str) -> f64 {
        Self::normalized_title_similarity(&Self::normalize_title(a), &Self::normalize_title(b))
    }

    fn normalized_title_similarity(a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        let token_sort = fuzz::token_sort_ratio(a.chars(), b.chars()) / 100.0;
        let token_set = fuzz::token_set_ratio(a.chars(), b.chars()) / 100.0;
        let partial = fuzz::partial_ratio(a.chars(), b.chars()) / 100.0;
        0.5 * token_sort + 0.3 * token_set + 0.2 * partial
    }

    // ─── Author similarity ────────────────────────────────────────

    pub fn normalize_author_name(name: &str) -> String {
        let lowered = name.to_lowercase();
        let expanded = INITIAL_DOT.replace_all(&lowered, "$1 ");
        expanded.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Two-pass alignment: exact normalized-name matches first, then
    /// initials matches (0.9) or a plain character ratio (> 0.85) over the
    /// leftovers. Scored against the longer list, capped at 1.0.
    pub fn author_list_similarity(a: &[Author], b: &[Author]) -> f64 {
        if a.is_empty() && b.is_empty() {
            return 1.0;
        }
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        let left: Vec<String> = a
            .iter()
            .map(|author| Self::normalize_author_name(&author.name))
            .collect();
        let right: Vec<String> = b
            .iter()
            .map(|author| Self::normalize_author_name(&author.name))
            .collect();

        let mut matched_left = vec![false; left.len()];
        let mut used_right = vec![false; right.len()];
        let mut score = 0.0;

        for (i, name) in left.iter().enumerate() {
            for (j, other) in right.iter().enumerate() {
                if !used_right[j] && name == other {
                    matched_left[i] = true;
                    used_right[j] = true;
                    score += 1.0;
                    break;
                }
            }
        }

        for (i, name) in left.iter().enumerate() {
            if matched_left[i] {
                continue;
            }
            for (j, other) in right.iter().enumerate() {
                if used_right[j] {
                    continue;
                }
                if initials_match(name, other) {
                    used_right[j] = true;
                    score += 0.9;
                    break;
                }
                let ratio = strsim::normalized_levenshtein(name, other);
                if ratio > 0.85 {
                    used_right[j] = true;
                    score += ratio;
                    break;
                }
            }
        }

        (score / left.len().max(right.len()) as f64).min(1.0)
    }

    // ─── Duplicate detection ──────────────────────────────────────

    /// Group records by normalized DOI, normalized arXiv id, and
    /// (cross-source only) raw paper id. One match per bucket of 2+.
    pub fn find_duplicates_exact(&self, records: &[PdfRecord]) -> Vec<ExactMatch> {
        let mut by_doi: HashMap<String, Vec<&PdfRecord>> = HashMap::new();
        let mut by_arxiv: HashMap<String, Vec<&PdfRecord>> = HashMap::new();
        let mut by_paper_id: HashMap<String, Vec<&PdfRecord>> = HashMap::new();

        for record in records {
            let Some(paper) = record.paper.as_deref() else {
                continue;
            };
            if let Some(doi) = paper.doi.as_deref().and_then(Doi::normalize) {
                by_doi.entry(doi).or_default().push(record);
            }
            if let Some(arxiv_id) = paper.arxiv_id.as_deref().and_then(ArxivId::normalize) {
                by_arxiv.entry(arxiv_id).or_default().push(record);
            }
            by_paper_id
                .entry(record.paper_id.clone())
                .or_default()
                .push(record);
        }

        let mut matches = Vec::new();
        collect_exact_groups(&mut matches, by_doi, MatchField::Doi, false);
        collect_exact_groups(&mut matches, by_arxiv, MatchField::ArxivId, false);
        collect_exact_groups(&mut matches, by_paper_id, MatchField::PaperId, true);
        matches
    }

    /// Pairwise content comparison. Title similarity gates the (more
    /// expensive) author comparison; venue/year agreement is recorded on
    /// the emitted match. Batches above the configured ceiling skip fuzzy
    /// matching entirely.
    pub fn find_duplicates_fuzzy(&self, records: &[PdfRecord]) -> Vec<FuzzyMatch> {
        if records.len() > self.max_fuzzy_records {
            warn!(
                records = records.len(),
                ceiling = self.max_fuzzy_records,
                "record count exceeds fuzzy-matching ceiling, skipping fuzzy duplicate detection"
            );
            return Vec::new();
        }

        let normalized_titles: Vec<Option<String>> = records
            .iter()
            .map(|record| {
                record
                    .paper
                    .as_deref()
                    .map(|paper| Self::normalize_title(&paper.title))
            })
            .collect();

        let mut matches = Vec::new();
        for i in 0..records.len() {
            let (Some(paper_a), Some(title_a)) =
                (records[i].paper.as_deref(), normalized_titles[i].as_deref())
            else {
                continue;
            };
            for j in (i + 1)..records.len() {
                let (Some(paper_b), Some(title_b)) =
                    (records[j].paper.as_deref(), normalized_titles[j].as_deref())
                else {
                    continue;
                };

                let title_similarity = Self::normalized_title_similarity(title_a, title_b);
                if title_similarity < self.title_threshold {
                    continue;
                }

                let author_similarity =
                    Self::author_list_similarity(&paper_a.authors, &paper_b.authors);
                if author_similarity < self.author_threshold {
                    continue;
                }

                matches.push(FuzzyMatch {
                    record_ids: vec![records[i].id, records[j].id],
                    title_similarity,
                    author_similarity,
                    venue_year_match: venue_year_match(paper_a, paper_b),
                });
            }
        }
        matches
    }
}

fn collect_exact_groups(
    matches: &mut Vec<ExactMatch>,
    buckets: HashMap<String, Vec<&PdfRecord>>,
    field: MatchField,
    require_distinct_sources: bool,
) {
    let mut keyed: Vec<(String, Vec<&PdfRecord>)> = buckets.into_iter().collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    for (value, group) in keyed {
        if group.len() < 2 {
            continue;
        }
        if require_distinct_sources && group.iter().all(|r| r.source == group[0].source) {
            continue;
        }
        matches.push(ExactMatch::new(
            group.iter().map(|r| r.id).collect(),
            field,
            value,
        ));
    }
}

fn initials_match(a: &str, b: &str) -> bool {
    let tokens_a: Vec<&str> = a.split_whitespace().collect();
    let tokens_b: Vec<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_a.len() != tokens_b.len() {
        return false;
    }
    tokens_a.iter().zip(&tokens_b).all(|(x, y)| {
        x == y
            || (x.chars().count() == 1 && y.starts_with(x))
            || (y.chars().count() == 1 && x.starts_with(y))
    })
}

fn venue_year_match(a: &Paper, b: &Paper) -> bool {
    let same_year = matches!((a.year, b.year), (Some(x), Some(y)) if x == y);
    if !same_year {
        return false;
    }
    let venue_a = a.venue.trim().to_lowercase();
    let venue_b = b.venue.trim().to_lowercase();
    !venue_a.is_empty()
        && !venue_b.is_empty()
        && (venue_a.contains(&venue_b) || venue_b.contains(&venue_a))
}
