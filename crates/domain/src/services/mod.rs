//! PII analysis and anonymization services.

pub mod analyzer;
pub mod anonymizer;
pub mod pattern_analyzer;

pub use analyzer::{AnalyzerError, PiiAnalyzer};
pub use anonymizer::{apply_policy, Anonymizer};
pub use pattern_analyzer::PatternAnalyzer;
