//! Small validators for user-supplied text fields.

use crate::error::{DomainError, DomainResult};

/// Trim `value` and reject it when empty or longer than `max_chars`.
pub fn required_text(field: &str, value: &str, max_chars: usize) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Like [`required_text`], but an all-whitespace value becomes `None`.
pub fn optional_text(field: &str, value: Option<&str>, max_chars: usize) -> DomainResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => required_text(field, v, max_chars).map(Some),
    }
}

/// Reject NaN, infinities and negative amounts.
pub fn non_negative_amount(field: &str, value: f64) -> DomainResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!("{field} must be a non-negative number")));
    }
    Ok(value)
}

/// Reject NaN, infinities, zero and negative amounts.
pub fn positive_amount(field: &str, value: f64) -> DomainResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::validation(format!("{field} must be greater than 0")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_accepts() {
        assert_eq!(required_text("name", "  Mug  ", 10).unwrap(), "Mug");
    }

    #[test]
    fn rejects_blank_and_long() {
        assert!(required_text("name", "   ", 10).is_err());
        assert!(required_text("name", "abcdefghijk", 10).is_err());
    }

    #[test]
    fn optional_blank_is_none() {
        assert_eq!(optional_text("bio", Some("  "), 10).unwrap(), None);
        assert_eq!(optional_text("bio", None, 10).unwrap(), None);
    }

    #[test]
    fn amounts() {
        assert!(non_negative_amount("price", 0.0).is_ok());
        assert!(non_negative_amount("price", -1.0).is_err());
        assert!(non_negative_amount("price", f64::NAN).is_err());
        assert!(positive_amount("amount", 0.0).is_err());
        assert!(positive_amount("amount", 12.5).is_ok());
    }
}
