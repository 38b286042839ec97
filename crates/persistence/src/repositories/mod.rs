//! Repository implementations for table storage operations.

pub mod feedback;

pub use feedback::{FeedbackRepository, FeedbackStore};
