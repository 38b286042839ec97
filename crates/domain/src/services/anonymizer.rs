//! Anonymization of free text.
//!
//! Combines an analyzer with a redaction policy: detected spans are resolved
//! into a non-overlapping set and rewritten according to the policy chosen
//! for the call site.

use std::sync::Arc;

use tracing::{debug, warn};

use super::analyzer::{AnalyzerError, PiiAnalyzer};
use crate::models::{AnonymizedItem, AnonymizedText, RecognizerResult, RedactionPolicy};

/// Language used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Redacts PII from text using a shared analyzer.
///
/// Cheap to clone; the analyzer is reference counted and used read-only.
#[derive(Clone)]
pub struct Anonymizer {
    analyzer: Arc<dyn PiiAnalyzer>,
    language: String,
    min_score: f64,
}

impl Anonymizer {
    pub fn new(analyzer: Arc<dyn PiiAnalyzer>) -> Self {
        Self {
            analyzer,
            language: DEFAULT_LANGUAGE.to_string(),
            min_score: 0.0,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Spans scoring below `min_score` are left untouched.
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn analyzer_name(&self) -> &'static str {
        self.analyzer.name()
    }

    pub async fn analyzer_available(&self) -> bool {
        self.analyzer.is_available().await
    }

    /// Redacts `text`, keeping URLs when `is_feedback` is set.
    pub async fn anonymize(
        &self,
        text: &str,
        is_feedback: bool,
    ) -> Result<AnonymizedText, AnalyzerError> {
        if text.trim().is_empty() {
            return Ok(AnonymizedText::unchanged(text));
        }

        let results = self.analyzer.analyze(text, &self.language).await?;
        let policy = RedactionPolicy::for_context(is_feedback);
        debug!(
            analyzer = self.analyzer.name(),
            policy = policy.name(),
            spans = results.len(),
            "Applying redaction policy"
        );
        Ok(apply_policy(text, &results, &policy, self.min_score))
    }
}

impl std::fmt::Debug for Anonymizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anonymizer")
            .field("analyzer", &self.analyzer.name())
            .field("language", &self.language)
            .field("min_score", &self.min_score)
            .finish()
    }
}

/// Rewrites `text` by applying `policy` to the detected spans.
///
/// Spans that fall outside the text, split a UTF-8 character, or score
/// below `min_score` are ignored. Overlaps are resolved by preferring the
/// longer span, then the higher score, then the earlier start; the losing
/// span keeps whatever part of it lies outside the winner.
pub fn apply_policy(
    text: &str,
    results: &[RecognizerResult],
    policy: &RedactionPolicy,
    min_score: f64,
) -> AnonymizedText {
    let spans = resolve_conflicts(text, results, min_score);
    if spans.is_empty() {
        return AnonymizedText::unchanged(text);
    }

    let mut output = String::with_capacity(text.len());
    let mut items = Vec::with_capacity(spans.len());
    let mut cursor = 0;

    for span in spans {
        let operator = policy.operator_for(&span.entity_type);
        output.push_str(&text[cursor..span.start]);
        output.push_str(&operator.apply(&span.entity_type, &text[span.start..span.end]));
        cursor = span.end;

        items.push(AnonymizedItem {
            entity_type: span.entity_type.clone(),
            operator,
        });
    }
    output.push_str(&text[cursor..]);

    AnonymizedText {
        text: output,
        items,
    }
}

/// Resolves overlapping spans into a disjoint set, sorted by start offset.
///
/// Spans are accepted in priority order. A lower-priority span is trimmed to
/// the parts not already covered, so every detected byte stays covered.
fn resolve_conflicts(
    text: &str,
    results: &[RecognizerResult],
    min_score: f64,
) -> Vec<RecognizerResult> {
    let mut candidates: Vec<&RecognizerResult> = results
        .iter()
        .filter(|r| {
            let valid = !r.is_empty()
                && r.end <= text.len()
                && text.is_char_boundary(r.start)
                && text.is_char_boundary(r.end);
            if !valid {
                warn!(
                    entity_type = %r.entity_type,
                    start = r.start,
                    end = r.end,
                    "Discarding analyzer result with invalid offsets"
                );
            }
            valid && r.score >= min_score
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| b.score.total_cmp(&a.score))
            .then_with(|| a.start.cmp(&b.start))
    });

    let mut accepted: Vec<RecognizerResult> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let remainders = uncovered_parts(candidate, &accepted);
        accepted.extend(remainders);
    }

    accepted.sort_by_key(|r| r.start);
    accepted
}

/// Parts of `span` not covered by any of `covered`.
fn uncovered_parts(span: &RecognizerResult, covered: &[RecognizerResult]) -> Vec<RecognizerResult> {
    let mut overlapping: Vec<&RecognizerResult> =
        covered.iter().filter(|c| c.overlaps(span)).collect();
    overlapping.sort_by_key(|c| c.start);

    let mut parts = Vec::new();
    let mut cursor = span.start;
    for c in overlapping {
        if c.start > cursor {
            parts.push(RecognizerResult::new(
                span.entity_type.clone(),
                cursor,
                c.start,
                span.score,
            ));
        }
        cursor = cursor.max(c.end);
    }
    if cursor < span.end {
        parts.push(RecognizerResult::new(
            span.entity_type.clone(),
            cursor,
            span.end,
            span.score,
        ));
    }
    parts
}
