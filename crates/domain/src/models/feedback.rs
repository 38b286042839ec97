//! Feedback domain models.

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use serde_json::Value as JsonValue;
use shared::serde_ext::required;
use uuid::Uuid;
use shared::validation::{table_string_units, MAX_TABLE_STRING_UNITS};
use validator::{Validate, ValidationError};

/// Table that receives feedback rows.
pub const FEEDBACK_TABLE: &str = "ESAIGPTFeedback";

/// Partition shared by every feedback row.
pub const GLOBAL_PARTITION_KEY: &str = "Global";

/// Feedback submitted for a single generated answer.
///
/// Every key must be present in the payload; values may be `null`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedbackSubmission {
    #[serde(deserialize_with = "required")]
    pub overall_response_quality: Option<i32>,

    #[serde(deserialize_with = "required")]
    pub overall_document_quality: Option<i32>,

    #[serde(deserialize_with = "required")]
    #[validate(custom(function = "shared::validation::validate_table_text"))]
    pub verbatim: Option<String>,

    #[serde(deserialize_with = "required")]
    pub inaccurate_answer: Option<bool>,

    #[serde(deserialize_with = "required")]
    pub missing_info: Option<bool>,

    #[serde(deserialize_with = "required")]
    pub too_long: Option<bool>,

    #[serde(deserialize_with = "required")]
    pub too_short: Option<bool>,

    #[serde(deserialize_with = "required")]
    pub confusing: Option<bool>,

    #[serde(deserialize_with = "required")]
    pub offensive: Option<bool>,

    #[serde(deserialize_with = "required")]
    pub biased: Option<bool>,

    #[serde(deserialize_with = "required")]
    pub outdated: Option<bool>,

    #[serde(deserialize_with = "required")]
    pub repetitive: Option<bool>,

    #[serde(deserialize_with = "required")]
    pub fantastic: Option<bool>,

    #[serde(deserialize_with = "required")]
    #[validate(custom(function = "shared::validation::validate_table_text"))]
    pub case_number: Option<String>,

    #[serde(deserialize_with = "required")]
    #[validate(custom(function = "shared::validation::validate_table_text"))]
    pub question_id: Option<String>,

    #[serde(deserialize_with = "required")]
    #[validate(custom(function = "shared::validation::validate_table_text"))]
    pub question: Option<String>,

    #[serde(deserialize_with = "required")]
    #[validate(custom(function = "shared::validation::validate_table_text"))]
    pub answer_id: Option<String>,

    #[serde(deserialize_with = "required")]
    #[validate(custom(function = "shared::validation::validate_table_text"))]
    pub answer: Option<String>,

    #[serde(rename = "contentIndex", deserialize_with = "required")]
    #[validate(custom(function = "shared::validation::validate_table_text"))]
    pub content_index: Option<String>,

    /// Retrieved documents shown with the answer; stored opaquely.
    #[validate(custom(function = "validate_top_docs"))]
    pub top_docs: JsonValue,

    #[serde(deserialize_with = "required")]
    pub in_domain: Option<bool>,
}

/// `top_docs` is stored as one JSON string property, so its serialized form
/// must fit the table service limit.
fn validate_top_docs(docs: &JsonValue) -> Result<(), ValidationError> {
    let fits = stored_json(docs)
        .map(|serialized| table_string_units(&serialized) <= MAX_TABLE_STRING_UNITS)
        .unwrap_or(false);

    if fits {
        Ok(())
    } else {
        let mut err = ValidationError::new("top_docs_length");
        err.message = Some("top_docs is too large to store".into());
        Err(err)
    }
}

/// Redacted replacements for the free-text fields of a submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RedactedFields {
    pub verbatim: Option<String>,
    pub question: Option<String>,
    pub answer: Option<String>,
}

/// Row persisted to the feedback table.
///
/// Field names match the columns of the existing table; `None` values are
/// omitted so the column is simply absent on that row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRecord {
    #[serde(rename = "PartitionKey")]
    pub partition_key: String,

    #[serde(rename = "RowKey")]
    pub row_key: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_response_quality: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_document_quality: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbatim: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inaccurate_answer: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_info: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub too_long: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub too_short: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confusing: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offensive: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub biased: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub outdated: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetitive: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fantastic: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    #[serde(rename = "contentIndex", skip_serializing_if = "Option::is_none")]
    pub content_index: Option<String>,

    pub top_docs: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_domain: Option<bool>,
}

impl FeedbackRecord {
    /// Assembles the row for a submission whose free text has already been redacted.
    ///
    /// Fails only if `top_docs` cannot be serialized back to text.
    pub fn new(
        partition_key: &str,
        row_key: Uuid,
        submission: &FeedbackSubmission,
        redacted: RedactedFields,
    ) -> Result<Self, serde_json::Error> {
        let top_docs = stored_json(&submission.top_docs)?;

        Ok(Self {
            partition_key: partition_key.to_string(),
            row_key: row_key.to_string(),
            overall_response_quality: submission.overall_response_quality,
            overall_document_quality: submission.overall_document_quality,
            verbatim: redacted.verbatim,
            inaccurate_answer: submission.inaccurate_answer,
            missing_info: submission.missing_info,
            too_long: submission.too_long,
            too_short: submission.too_short,
            confusing: submission.confusing,
            offensive: submission.offensive,
            biased: submission.biased,
            outdated: submission.outdated,
            repetitive: submission.repetitive,
            fantastic: submission.fantastic,
            case_number: submission.case_number.clone(),
            question_id: submission.question_id.clone(),
            question: redacted.question,
            answer_id: submission.answer_id.clone(),
            answer: redacted.answer,
            content_index: submission.content_index.clone(),
            top_docs,
            in_domain: submission.in_domain,
        })
    }

    /// First string column that no longer fits the table service limit.
    ///
    /// Redaction placeholders can be longer than the text they replace, so a
    /// submission that passed validation may still overflow once redacted.
    pub fn oversized_property(&self) -> Option<&'static str> {
        let columns = [
            ("verbatim", self.verbatim.as_deref()),
            ("question", self.question.as_deref()),
            ("answer", self.answer.as_deref()),
            ("top_docs", Some(self.top_docs.as_str())),
        ];

        columns.into_iter().find_map(|(name, value)| {
            value
                .filter(|text| table_string_units(text) > MAX_TABLE_STRING_UNITS)
                .map(|_| name)
        })
    }
}

/// Escapes every non-ASCII character as `\uXXXX` (UTF-16, lowercase hex).
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Serializes `value` the way existing `top_docs` cells are stored: compact,
/// keys sorted, ASCII only, newline terminated.
fn stored_json(value: &JsonValue) -> Result<String, serde_json::Error> {
    let mut serializer = serde_json::Serializer::with_formatter(Vec::new(), AsciiFormatter);
    value.serialize(&mut serializer)?;

    let mut text = String::from_utf8(serializer.into_inner())
        .map_err(<serde_json::Error as serde::ser::Error>::custom)?;
    text.push('\n');
    Ok(text)
}

/// Response returned to the client after a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub success: bool,
    /// The submission exactly as received.
    pub feedback: JsonValue,
}
