use once_cell::sync::Lazy;
use regex::Regex;

use crate::identifiers::{ArxivId, Doi};

static DOI_SEARCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)10\.\d{4,}/[-._;()/:a-z0-9]*[a-z0-9/]").unwrap());

// Digit boundaries keep the new-format pattern from matching the middle of
// a longer digit run (common inside DOI suffixes).
static ARXIV_NEW_SEARCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^0-9])(\d{4}\.\d{4,5}(v\d+)?)(?:[^0-9]|$)").unwrap());

static ARXIV_OLD_SEARCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[a-z][a-z\-]*(\.[A-Z]{2})?/\d{7}(v\d+)?").unwrap());

/// Identifiers found embedded in a URL. Either, both, or neither may be
/// present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlIdentifiers {
    pub doi: Option<Doi>,
    pub arxiv_id: Option<ArxivId>,
}

/// Search a URL for an embedded DOI and/or arXiv identifier.
///
/// Search patterns are looser than the strict parsers; every candidate is
/// re-validated through `Doi::parse` / `ArxivId::parse` before it is
/// reported.
pub fn extract_identifiers_from_url(url: &str) -> UrlIdentifiers {
    let doi = DOI_SEARCH
        .find_iter(url)
        .find_map(|m| Doi::parse(m.as_str()).ok());

    let arxiv_id = ARXIV_NEW_SEARCH
        .captures_iter(url)
        .find_map(|caps| ArxivId::parse(&caps[1]).ok())
        .or_else(|| {
            ARXIV_OLD_SEARCH
                .find_iter(url)
                .find_map(|m| ArxivId::parse(m.as_str()).ok())
        });

    UrlIdentifiers { doi, arxiv_id }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_doi_in_publisher_url() {
        let ids = extract_identifiers_from_url("https://dl.acm.org/doi/pdf/10.1145/3313831.3376166");
        assert_eq!(
            ids.doi.map(|d| d.normalized).as_deref(),
            Some("10.1145/3313831.3376166")
        );
        assert!(ids.arxiv_id.is_none());
    }

    #[test]
    fn finds_arxiv_id_in_pdf_url() {
        let ids = extract_identifiers_from_url("https://arxiv.org/pdf/1706.03762v5.pdf");
        assert_eq!(ids.arxiv_id.map(|a| a.id).as_deref(), Some("1706.03762"));
        assert!(ids.doi.is_none());
    }

    #[test]
    fn finds_legacy_arxiv_id() {
        let ids = extract_identifiers_from_url("http://arxiv.org/abs/hep-th/9901001");
        assert_eq!(ids.arxiv_id.map(|a| a.id).as_deref(), Some("hep-th/9901001"));
    }

    #[test]
    fn finds_both_when_both_present() {
        let ids = extract_identifiers_from_url(
            "https://mirror.example.org/10.48550/arxiv.1706.03762?alt=1706.03762v1",
        );
        assert!(ids.doi.is_some());
        assert!(ids.arxiv_id.is_some());
    }

    #[test]
    fn finds_neither_in_plain_url() {
        let ids = extract_identifiers_from_url("https://example.com/papers/attention.pdf");
        assert_eq!(ids, UrlIdentifiers::default());
    }
}
