//! Domain models for the feedback service.

pub mod feedback;
pub mod redaction;

pub use feedback::{
    FeedbackRecord, FeedbackResponse, FeedbackSubmission, RedactedFields, FEEDBACK_TABLE,
    GLOBAL_PARTITION_KEY,
};
pub use redaction::{
    entity, AnonymizedItem, AnonymizedText, Operator, RecognizerResult, RedactionPolicy,
};
