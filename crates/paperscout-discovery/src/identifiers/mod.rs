pub mod arxiv;
pub mod doi;
pub mod extract;

pub use arxiv::ArxivId;
pub use doi::Doi;
pub use extract::{UrlIdentifiers, extract_identifiers_from_url};
