//! Built-in pattern-based PII analyzer.
//!
//! Detects structured identifiers with regular expressions plus checksum or
//! range validation where the format allows it. Names are only caught when
//! introduced by an honorific or "my name is"; full NER needs a remote
//! analyzer.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use super::analyzer::{AnalyzerError, PiiAnalyzer};
use crate::models::{entity, RecognizerResult};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}\b").unwrap();
    static ref URL_REGEX: Regex =
        Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"'(){}\[\]]+"#).unwrap();
    // Only a bare digit run needs a word boundary in front, so the match never
    // depends on whether the preceding character was itself redacted.
    static ref PHONE_REGEX: Regex = Regex::new(
        r"(?P<pii>\+\d{1,3}[\s.-]?(?:\(\d{3}\)\s?|\d{3}[\s.-])\d{3}[\s.-]\d{4}|\(\d{3}\)\s?\d{3}[\s.-]\d{4}|\b\d{3}[\s.-]\d{3}[\s.-]\d{4})\b"
    )
    .unwrap();
    static ref SSN_REGEX: Regex = Regex::new(r"\b(\d{3})-(\d{2})-(\d{4})\b").unwrap();
    static ref CREDIT_CARD_REGEX: Regex = Regex::new(r"\b(?:\d[ -]?){12,18}\d\b").unwrap();
    static ref IP_REGEX: Regex = Regex::new(
        r"\b(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\b"
    )
    .unwrap();
    static ref PERSON_REGEX: Regex = Regex::new(
        r"\b(?:(?:Mr|Mrs|Ms|Miss|Dr|Prof)\.?|(?i:my name is))\s+(?P<pii>[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)?)\b"
    )
    .unwrap();
}

const EMAIL_SCORE: f64 = 1.0;
const URL_SCORE: f64 = 0.5;
const PHONE_SCORE: f64 = 0.75;
const SSN_SCORE: f64 = 0.85;
const CREDIT_CARD_SCORE: f64 = 1.0;
const IP_SCORE: f64 = 0.6;
const PERSON_SCORE: f64 = 0.85;

/// Trailing characters that end a sentence rather than a URL.
const URL_TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Languages the built-in patterns are tuned for.
const SUPPORTED_LANGUAGES: &[&str] = &["en"];

/// Regex-driven analyzer that runs in-process.
#[derive(Debug, Clone, Default)]
pub struct PatternAnalyzer;

impl PatternAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Runs every recognizer over `text`. Results are unsorted and may overlap.
    pub fn detect(&self, text: &str) -> Vec<RecognizerResult> {
        let mut results = Vec::new();

        for m in EMAIL_REGEX.find_iter(text) {
            results.push(RecognizerResult::new(
                entity::EMAIL_ADDRESS,
                m.start(),
                m.end(),
                EMAIL_SCORE,
            ));
        }

        for m in URL_REGEX.find_iter(text) {
            let trimmed = m.as_str().trim_end_matches(URL_TRAILING_PUNCTUATION);
            if trimmed.len() > "www.".len() {
                results.push(RecognizerResult::new(
                    entity::URL,
                    m.start(),
                    m.start() + trimmed.len(),
                    URL_SCORE,
                ));
            }
        }

        for caps in PHONE_REGEX.captures_iter(text) {
            if let Some(m) = caps.name("pii") {
                results.push(RecognizerResult::new(
                    entity::PHONE_NUMBER,
                    m.start(),
                    m.end(),
                    PHONE_SCORE,
                ));
            }
        }

        for caps in SSN_REGEX.captures_iter(text) {
            if is_plausible_ssn(&caps[1], &caps[2], &caps[3]) {
                if let Some(m) = caps.get(0) {
                    results.push(RecognizerResult::new(
                        entity::US_SSN,
                        m.start(),
                        m.end(),
                        SSN_SCORE,
                    ));
                }
            }
        }

        for m in CREDIT_CARD_REGEX.find_iter(text) {
            if passes_luhn(m.as_str()) {
                results.push(RecognizerResult::new(
                    entity::CREDIT_CARD,
                    m.start(),
                    m.end(),
                    CREDIT_CARD_SCORE,
                ));
            }
        }

        for m in IP_REGEX.find_iter(text) {
            results.push(RecognizerResult::new(
                entity::IP_ADDRESS,
                m.start(),
                m.end(),
                IP_SCORE,
            ));
        }

        for caps in PERSON_REGEX.captures_iter(text) {
            if let Some(m) = caps.name("pii") {
                results.push(RecognizerResult::new(
                    entity::PERSON,
                    m.start(),
                    m.end(),
                    PERSON_SCORE,
                ));
            }
        }

        results
    }
}

#[async_trait]
impl PiiAnalyzer for PatternAnalyzer {
    fn name(&self) -> &'static str {
        "builtin"
    }

    async fn analyze(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Vec<RecognizerResult>, AnalyzerError> {
        if !SUPPORTED_LANGUAGES.contains(&language) {
            return Err(AnalyzerError::UnsupportedLanguage(language.to_string()));
        }
        Ok(self.detect(text))
    }
}

/// Rejects area, group and serial numbers that are never issued.
fn is_plausible_ssn(area: &str, group: &str, serial: &str) -> bool {
    let area_ok = area != "000" && area != "666" && !area.starts_with('9');
    area_ok && group != "00" && serial != "0000"
}

/// Luhn checksum over the digits of a candidate card number.
fn passes_luhn(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}
