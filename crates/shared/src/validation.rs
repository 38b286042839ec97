//! Common validation utilities.

use validator::ValidationError;

/// Longest string property accepted by the table service, in UTF-16 code units.
///
/// The service caps string properties at 64 KiB of UTF-16; this stays a little
/// under that.
pub const MAX_TABLE_STRING_UNITS: usize = 32_000;

/// Length of `text` as stored by the table service.
pub fn table_string_units(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Validates that `text` fits in a single table string property.
pub fn validate_table_text(text: &str) -> Result<(), ValidationError> {
    if table_string_units(text) <= MAX_TABLE_STRING_UNITS {
        Ok(())
    } else {
        let mut err = ValidationError::new("table_text_length");
        err.message = Some(
            format!(
                "Text fields are limited to {} characters",
                MAX_TABLE_STRING_UNITS
            )
            .into(),
        );
        Err(err)
    }
}

/// Validates an Azure table name: 3-63 alphanumeric characters, starting with a letter.
pub fn validate_table_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    let starts_with_letter = name
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic())
        .unwrap_or(false);

    if (3..=63).contains(&len)
        && starts_with_letter
        && name.chars().all(|c| c.is_ascii_alphanumeric())
    {
        Ok(())
    } else {
        let mut err = ValidationError::new("table_name_format");
        err.message = Some(
            "Table name must be 3-63 alphanumeric characters and start with a letter".into(),
        );
        Err(err)
    }
}

/// Validates a key value usable as a table partition or row key.
///
/// The table service rejects `/`, `\`, `#`, `?` and control characters in
/// keys, and caps them at 1 KiB.
pub fn validate_table_key(key: &str) -> Result<(), ValidationError> {
    let forbidden = key
        .chars()
        .any(|c| matches!(c, '/' | '\\' | '#' | '?') || c.is_control());

    if key.is_empty() || key.len() > 1024 || forbidden {
        let mut err = ValidationError::new("table_key_format");
        err.message = Some(
            "Key must be 1-1024 bytes without '/', '\\', '#', '?' or control characters".into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Validates a two-letter language code such as `en`.
pub fn validate_language_code(code: &str) -> Result<(), ValidationError> {
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("language_code");
        err.message = Some("Language must be a two-letter lowercase code".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("ESAIGPTFeedback").is_ok());
        assert!(validate_table_name("abc").is_ok());
        assert!(validate_table_name("ab").is_err());
        assert!(validate_table_name("1Feedback").is_err());
        assert!(validate_table_name("feed-back").is_err());
        assert!(validate_table_name(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_validate_table_name_error_message() {
        let err = validate_table_name("").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Table name must be 3-63 alphanumeric characters and start with a letter"
        );
    }

    #[test]
    fn test_validate_table_text() {
        assert!(validate_table_text("").is_ok());
        assert!(validate_table_text(&"x".repeat(MAX_TABLE_STRING_UNITS)).is_ok());
        assert!(validate_table_text(&"x".repeat(MAX_TABLE_STRING_UNITS + 1)).is_err());
    }

    #[test]
    fn test_table_string_units_counts_utf16() {
        assert_eq!(table_string_units("abc"), 3);
        assert_eq!(table_string_units("é"), 1);
        // Astral characters take a surrogate pair.
        assert_eq!(table_string_units("😀"), 2);

        let emoji = "😀".repeat(MAX_TABLE_STRING_UNITS / 2 + 1);
        assert!(emoji.chars().count() < MAX_TABLE_STRING_UNITS);
        assert!(validate_table_text(&emoji).is_err());
    }

    #[test]
    fn test_validate_table_key() {
        assert!(validate_table_key("Global").is_ok());
        assert!(validate_table_key("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_table_key("").is_err());
        assert!(validate_table_key("a/b").is_err());
        assert!(validate_table_key("a#b").is_err());
        assert!(validate_table_key("a?b").is_err());
        assert!(validate_table_key("tab\there").is_err());
        assert!(validate_table_key(&"k".repeat(1025)).is_err());
    }

    #[test]
    fn test_validate_language_code() {
        assert!(validate_language_code("en").is_ok());
        assert!(validate_language_code("de").is_ok());
        assert!(validate_language_code("EN").is_err());
        assert!(validate_language_code("eng").is_err());
        assert!(validate_language_code("").is_err());
    }
}
