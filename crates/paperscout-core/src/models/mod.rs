pub mod matching;
pub mod paper;
pub mod record;
pub mod result;

pub use matching::{
    DeduplicationDecision, DeduplicationStats, ExactMatch, FuzzyMatch, MatchField,
};
pub use paper::{Author, Paper};
pub use record::{PdfRecord, ValidationStatus, VersionInfo};
pub use result::{DiscoveryResult, SourceStatistics};
