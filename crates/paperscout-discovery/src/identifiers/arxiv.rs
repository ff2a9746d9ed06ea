use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, Result};

// New format: YYMM.NNNNN with an optional version suffix.
static NEW_FORMAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4}\.\d{4,5})(v(\d+))?$").unwrap());

// Legacy format: archive[.SC]/YYMMNNN, e.g. cs.AI/0601001 or hep-th/9901001.
static OLD_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z][a-zA-Z.\-]*/\d{7})(v(\d+))?$").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArxivId {
    pub raw: String,
    /// Canonical id, version suffix removed.
    pub id: String,
    pub version: Option<u32>,
    pub abs_url: String,
    pub pdf_url: String,
    pub category: Option<String>,
}

impl ArxivId {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        // Strip URL forms (any scheme or host casing), then the arXiv:
        // prefix, then a trailing ".pdf" from pdf links.
        let lowered = input.to_ascii_lowercase();
        let mut stripped = if let Some(pos) = lowered.find("arxiv.org/abs/") {
            &input[pos + "arxiv.org/abs/".len()..]
        } else if let Some(pos) = lowered.find("arxiv.org/pdf/") {
            &input[pos + "arxiv.org/pdf/".len()..]
        } else {
            input
        };
        if let Some(rest) = stripped.strip_prefix("arXiv:") {
            stripped = rest;
        } else if let Some(rest) = stripped.strip_prefix("arxiv:") {
            stripped = rest;
        }
        let stripped = stripped.trim_end_matches(".pdf");

        if let Some(caps) = NEW_FORMAT.captures(stripped) {
            let id = caps.get(1).unwrap().as_str().to_string();
            let version = caps.get(3).and_then(|v| v.as_str().parse::<u32>().ok());
            return Ok(Self {
                raw: input.to_string(),
                abs_url: format!("https://arxiv.org/abs/{id}"),
                pdf_url: format!("https://arxiv.org/pdf/{id}"),
                id,
                version,
                category: None,
            });
        }

        if let Some(caps) = OLD_FORMAT.captures(stripped) {
            let id = caps.get(1).unwrap().as_str().to_string();
            let version = caps.get(3).and_then(|v| v.as_str().parse::<u32>().ok());
            let category = id.split('/').next().map(ToOwned::to_owned);
            return Ok(Self {
                raw: input.to_string(),
                abs_url: format!("https://arxiv.org/abs/{id}"),
                pdf_url: format!("https://arxiv.org/pdf/{id}"),
                id,
                version,
                category,
            });
        }

        Err(DiscoveryError::InvalidArxivId(input.to_string()))
    }

    /// Canonical id of a raw arXiv identifier string, if it is one.
    pub fn normalize(input: &str) -> Option<String> {
        Self::parse(input).ok().map(|arxiv| arxiv.id)
    }
}
