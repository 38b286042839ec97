//! Redaction domain models.
//!
//! Detected PII spans, the operators applied to them, and the named
//! policies that map entity categories to operators.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Entity category names, following the Presidio naming scheme.
pub mod entity {
    pub const CREDIT_CARD: &str = "CREDIT_CARD";
    pub const EMAIL_ADDRESS: &str = "EMAIL_ADDRESS";
    pub const IP_ADDRESS: &str = "IP_ADDRESS";
    pub const PERSON: &str = "PERSON";
    pub const PHONE_NUMBER: &str = "PHONE_NUMBER";
    pub const URL: &str = "URL";
    pub const US_SSN: &str = "US_SSN";
}

/// A PII span detected by an analyzer.
///
/// `start` and `end` are byte offsets into the analyzed text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizerResult {
    pub entity_type: String,
    pub start: usize,
    pub end: usize,
    pub score: f64,
}

impl RecognizerResult {
    pub fn new(entity_type: impl Into<String>, start: usize, end: usize, score: f64) -> Self {
        Self {
            entity_type: entity_type.into(),
            start,
            end,
            score,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the two spans share at least one byte.
    pub fn overlaps(&self, other: &RecognizerResult) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Action applied to a detected span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Replace the span with a `<ENTITY_TYPE>` placeholder.
    Replace,
    /// Leave the original text in place.
    Keep,
}

impl Operator {
    /// Produces the output text for a span of `entity_type` with original text `original`.
    pub fn apply<'a>(&self, entity_type: &str, original: &'a str) -> std::borrow::Cow<'a, str> {
        match self {
            Operator::Replace => std::borrow::Cow::Owned(placeholder(entity_type)),
            Operator::Keep => std::borrow::Cow::Borrowed(original),
        }
    }
}

/// Placeholder token substituted for a replaced span.
pub fn placeholder(entity_type: &str) -> String {
    format!("<{}>", entity_type)
}

/// Mapping from entity category to operator, with a fallback operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionPolicy {
    name: &'static str,
    overrides: HashMap<String, Operator>,
    default: Operator,
}

impl RedactionPolicy {
    /// Policy for user-written feedback: URLs are kept, everything else is replaced.
    pub fn feedback() -> Self {
        let mut overrides = HashMap::new();
        overrides.insert(entity::URL.to_string(), Operator::Keep);
        Self {
            name: "feedback",
            overrides,
            default: Operator::Replace,
        }
    }

    /// Policy for questions and answers: every category is replaced, URLs included.
    pub fn standard() -> Self {
        Self {
            name: "default",
            overrides: HashMap::new(),
            default: Operator::Replace,
        }
    }

    /// Selects the policy for a call site.
    pub fn for_context(is_feedback: bool) -> Self {
        if is_feedback {
            Self::feedback()
        } else {
            Self::standard()
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn operator_for(&self, entity_type: &str) -> Operator {
        self.overrides
            .get(entity_type)
            .copied()
            .unwrap_or(self.default)
    }
}

/// One span handled during anonymization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnonymizedItem {
    pub entity_type: String,
    pub operator: Operator,
}

/// Output of an anonymization pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnonymizedText {
    pub text: String,
    pub items: Vec<AnonymizedItem>,
}

impl AnonymizedText {
    /// Text that needed no changes.
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            items: Vec::new(),
        }
    }

    /// Number of spans replaced by a placeholder.
    pub fn redacted_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.operator == Operator::Replace)
            .count()
    }

    /// Number of detected spans left in place by the policy.
    pub fn kept_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.operator == Operator::Keep)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_policy_keeps_urls() {
        let policy = RedactionPolicy::feedback();
        assert_eq!(policy.operator_for(entity::URL), Operator::Keep);
        assert_eq!(policy.operator_for(entity::PERSON), Operator::Replace);
        assert_eq!(policy.operator_for(entity::EMAIL_ADDRESS), Operator::Replace);
        assert_eq!(policy.operator_for("SOMETHING_NEW"), Operator::Replace);
    }

    #[test]
    fn test_standard_policy_replaces_everything() {
        let policy = RedactionPolicy::standard();
        assert_eq!(policy.operator_for(entity::URL), Operator::Replace);
        assert_eq!(policy.operator_for(entity::PHONE_NUMBER), Operator::Replace);
    }

    #[test]
    fn test_for_context() {
        assert_eq!(RedactionPolicy::for_context(true), RedactionPolicy::feedback());
        assert_eq!(RedactionPolicy::for_context(false), RedactionPolicy::standard());
        assert_eq!(RedactionPolicy::for_context(true).name(), "feedback");
        assert_eq!(RedactionPolicy::for_context(false).name(), "default");
    }

    #[test]
    fn test_operator_apply() {
        assert_eq!(Operator::Replace.apply("PERSON", "Jane"), "<PERSON>");
        assert_eq!(Operator::Keep.apply("URL", "https://x/y"), "https://x/y");
    }

    #[test]
    fn test_recognizer_result_overlaps() {
        let a = RecognizerResult::new("A", 0, 5, 1.0);
        let b = RecognizerResult::new("B", 4, 8, 1.0);
        let c = RecognizerResult::new("C", 5, 9, 1.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert_eq!(a.len(), 5);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_anonymized_text_counts() {
        let text = AnonymizedText {
            text: "<PERSON> https://x".to_string(),
            items: vec![
                AnonymizedItem {
                    entity_type: entity::PERSON.to_string(),
                    operator: Operator::Replace,
                },
                AnonymizedItem {
                    entity_type: entity::URL.to_string(),
                    operator: Operator::Keep,
                },
            ],
        };
        assert_eq!(text.redacted_count(), 1);
        assert_eq!(text.kept_count(), 1);
        assert_eq!(AnonymizedText::unchanged("x").redacted_count(), 0);
    }
}
