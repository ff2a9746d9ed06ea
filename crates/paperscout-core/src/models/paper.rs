use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            affiliation: None,
        }
    }
}

/// Bibliographic facts for one paper, supplied by the upstream metadata
/// pipeline. Created once, never mutated by the discovery pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    /// Opaque external identifier.
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub authors: Vec<Author>,

    pub venue: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(default)]
    pub citation_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arxiv_id: Option<String>,
}

impl Paper {
    pub fn new(id: impl Into<String>, title: impl Into<String>, venue: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            venue: venue.into(),
            year: None,
            citation_count: 0,
            doi: None,
            arxiv_id: None,
        }
    }
}
