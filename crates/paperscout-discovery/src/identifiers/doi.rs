use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, Result};

// Registrant prefix of at least four digits, non-empty suffix without
// whitespace.
static DOI_FORMAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^10\.\d{4,}/\S+$").unwrap());

const URL_PREFIXES: [&str; 5] = [
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi:",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doi {
    pub raw: String,
    pub normalized: String,
    pub url: String,
}

impl Doi {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        // Strip known prefixes, case-insensitively ("DOI:" and "doi:" both
        // occur in the wild).
        let mut stripped = input;
        for prefix in URL_PREFIXES {
            if let Some(head) = stripped.get(..prefix.len())
                && head.eq_ignore_ascii_case(prefix)
            {
                stripped = stripped[prefix.len()..].trim_start();
                break;
            }
        }

        if !DOI_FORMAT.is_match(stripped) {
            return Err(DiscoveryError::InvalidDoi(input.to_string()));
        }

        let normalized = stripped.to_lowercase();
        let url = format!("https://doi.org/{normalized}");

        Ok(Self {
            raw: input.to_string(),
            normalized,
            url,
        })
    }

    /// Canonical form of a raw DOI string, if it is one.
    pub fn normalize(input: &str) -> Option<String> {
        Self::parse(input).ok().map(|doi| doi.normalized)
    }
}
