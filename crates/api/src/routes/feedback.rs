//! Feedback submission endpoint handler.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use domain::models::{FeedbackRecord, FeedbackResponse, FeedbackSubmission, RedactedFields};
use domain::services::{AnalyzerError, Anonymizer};
use serde_json::Value as JsonValue;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{
    record_analyzer_failure, record_entities_redacted, record_feedback_submission,
};

/// Redacts one optional text field. `None` stays `None`.
async fn redact_field(
    anonymizer: &Anonymizer,
    field: &'static str,
    text: Option<&str>,
    is_feedback: bool,
) -> Result<Option<String>, AnalyzerError> {
    let Some(text) = text else {
        return Ok(None);
    };

    let result = anonymizer.anonymize(text, is_feedback).await?;
    debug!(
        field,
        redacted = result.redacted_count(),
        kept = result.kept_count(),
        "Field redacted"
    );
    record_entities_redacted(field, result.redacted_count());
    Ok(Some(result.text))
}

/// Redacts the free-text fields: `verbatim` with the feedback policy,
/// `question` and `answer` with the default policy.
async fn redact_submission(
    anonymizer: &Anonymizer,
    submission: &FeedbackSubmission,
) -> Result<RedactedFields, AnalyzerError> {
    let (verbatim, question, answer) = tokio::try_join!(
        redact_field(anonymizer, "verbatim", submission.verbatim.as_deref(), true),
        redact_field(anonymizer, "question", submission.question.as_deref(), false),
        redact_field(anonymizer, "answer", submission.answer.as_deref(), false),
    )?;

    Ok(RedactedFields {
        verbatim,
        question,
        answer,
    })
}

/// Accept feedback for a generated answer.
///
/// POST /feedback
///
/// Free text is redacted before the row is written; the response echoes the
/// submission as received.
pub async fn submit_feedback(
    State(state): State<AppState>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let Json(body) = payload?;
    let submission: FeedbackSubmission = serde_json::from_value(body.clone())?;
    submission.validate()?;

    let row_key = Uuid::new_v4();

    let redacted = redact_submission(&state.anonymizer, &submission)
        .await
        .map_err(|e| {
            record_analyzer_failure(state.anonymizer.analyzer_name());
            e
        })?;

    let record = FeedbackRecord::new(
        &state.config.feedback.partition_key,
        row_key,
        &submission,
        redacted,
    )
    .map_err(|e| ApiError::Internal(format!("Failed to serialize top_docs: {}", e)))?;

    if let Some(column) = record.oversized_property() {
        return Err(ApiError::Validation(format!(
            "{} is too long to store after redaction",
            column
        )));
    }

    let persisted = match &state.store {
        Some(store) => {
            store.insert(&record).await?;
            true
        }
        None => {
            debug!(row_key = %row_key, "No feedback store configured, skipping insert");
            false
        }
    };

    record_feedback_submission(persisted);
    info!(
        row_key = %row_key,
        persisted = persisted,
        question_id = submission.question_id.as_deref().unwrap_or(""),
        "Feedback received"
    );

    Ok(Json(FeedbackResponse {
        success: true,
        feedback: body,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::services::PatternAnalyzer;
    use serde_json::json;
    use std::sync::Arc;

    fn submission(verbatim: Option<&str>, question: Option<&str>) -> FeedbackSubmission {
        serde_json::from_value(json!({
            "overall_response_quality": 1,
            "overall_document_quality": 1,
            "verbatim": verbatim,
            "inaccurate_answer": true,
            "missing_info": null,
            "too_long": null,
            "too_short": null,
            "confusing": null,
            "offensive": null,
            "biased": null,
            "outdated": null,
            "repetitive": null,
            "fantastic": null,
            "case_number": null,
            "question_id": null,
            "question": question,
            "answer_id": null,
            "answer": null,
            "contentIndex": null,
            "top_docs": [],
            "in_domain": null
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_redact_submission_policies() {
        let anonymizer = Anonymizer::new(Arc::new(PatternAnalyzer::new()));
        let redacted = redact_submission(
            &anonymizer,
            &submission(
                Some("see https://contoso.com/a and mail a@b.io"),
                Some("is https://contoso.com/a right?"),
            ),
        )
        .await
        .unwrap();

        assert_eq!(
            redacted.verbatim.as_deref(),
            Some("see https://contoso.com/a and mail <EMAIL_ADDRESS>")
        );
        assert_eq!(redacted.question.as_deref(), Some("is <URL> right?"));
        assert_eq!(redacted.answer, None);
    }

    #[tokio::test]
    async fn test_redact_field_none_stays_none() {
        let anonymizer = Anonymizer::new(Arc::new(PatternAnalyzer::new()));
        assert_eq!(
            redact_field(&anonymizer, "answer", None, false).await.unwrap(),
            None
        );
    }
}
