//! Input validation helpers
//!
//! Length limits and checks shared by the client (before dispatch) and the
//! reference backend (on receipt).

use chrono::NaiveDate;

use crate::error::ValidationError;

// ── Text length limits ──────────────────────────────────────────────

/// Support titles
pub const MAX_TITLE_LEN: usize = 200;

/// Short descriptions, custom subjects, reasons
pub const MAX_SHORT_TEXT_LEN: usize = 500;

/// Learning objectives and other free text
pub const MAX_LONG_TEXT_LEN: usize = 5000;

/// Calendar date format used by `start_date` / `end_date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ── Helpers ─────────────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(
    value: &str,
    field: &str,
    max_len: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::field(
            field,
            format!("{field} must not be empty"),
        ));
    }
    validate_len(value, field, max_len)
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(v) => validate_len(v, field, max_len),
        None => Ok(()),
    }
}

fn validate_len(value: &str, field: &str, max_len: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max_len {
        return Err(ValidationError::field(
            field,
            format!("{field} is too long ({len} chars, max {max_len})"),
        ));
    }
    Ok(())
}

/// Trim an identifier and reject it when nothing is left.
pub fn normalize_id<'a>(value: &'a str, field: &str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::field(
            field,
            format!("{field} must not be empty"),
        ));
    }
    Ok(trimmed)
}

/// Parse an optional `YYYY-MM-DD` date.
pub fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|_| {
            ValidationError::field(field, format!("{field} must be a date in YYYY-MM-DD format"))
        })
}

/// Check scheduling bounds: both optional, `end_date >= start_date` when both set.
pub fn validate_date_range(
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<(), ValidationError> {
    let start = parse_date(start_date, "start_date")?;
    let end = parse_date(end_date, "end_date")?;
    if let (Some(start), Some(end)) = (start, end)
        && end < start
    {
        return Err(ValidationError::field(
            "end_date",
            format!("end_date ({end}) must not be before start_date ({start})"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Algebra", "title", MAX_TITLE_LEN).is_ok());
        let err = validate_required_text("   ", "title", MAX_TITLE_LEN).unwrap_err();
        assert_eq!(err.field_name(), Some("title"));

        let long = "x".repeat(MAX_TITLE_LEN + 1);
        let err = validate_required_text(&long, "title", MAX_TITLE_LEN).unwrap_err();
        assert!(err.message.contains("too long"));
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(None, "reason", 10).is_ok());
        assert!(validate_optional_text(Some("short"), "reason", 10).is_ok());
        assert!(validate_optional_text(Some("far too long"), "reason", 10).is_err());
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("  abc \n", "support_id").unwrap(), "abc");
        assert!(normalize_id(" \t ", "chat_id").is_err());
    }

    #[test]
    fn test_date_range() {
        assert!(validate_date_range(None, None).is_ok());
        assert!(validate_date_range(Some("2025-01-10"), None).is_ok());
        assert!(validate_date_range(Some("2025-01-10"), Some("2025-01-10")).is_ok());
        assert!(validate_date_range(Some("2025-01-10"), Some("2025-02-01")).is_ok());

        let err = validate_date_range(Some("2025-02-01"), Some("2025-01-10")).unwrap_err();
        assert_eq!(err.field_name(), Some("end_date"));

        let err = validate_date_range(Some("10/01/2025"), None).unwrap_err();
        assert_eq!(err.field_name(), Some("start_date"));
    }

    #[test]
    fn test_blank_date_is_unset() {
        assert_eq!(parse_date(Some("  "), "start_date").unwrap(), None);
    }
}
