//! Request field checks shared by the handlers.

use std::ops::RangeInclusive;

use super::ApiError;

/// Check the character count of a required field.
pub fn length(field: &str, value: &str, range: RangeInclusive<usize>) -> Result<(), ApiError> {
    let len = value.chars().count();
    if range.contains(&len) {
        return Ok(());
    }
    Err(ApiError::bad_request(format!(
        "{field} must be between {} and {} characters",
        range.start(),
        range.end()
    )))
}

/// Check an optional field's length, if present.
pub fn optional_length(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ApiError> {
    match value {
        Some(v) => length(field, v, 0..=max),
        None => Ok(()),
    }
}

pub fn alphanumeric(field: &str, value: &str) -> Result<(), ApiError> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Ok(());
    }
    Err(ApiError::bad_request(format!("{field} must be alphanumeric")))
}

pub fn email(value: Option<&str>) -> Result<(), ApiError> {
    match value {
        Some(v) if !v.contains('@') => Err(ApiError::bad_request("email is invalid")),
        _ => Ok(()),
    }
}

pub fn in_range(field: &str, value: i64, range: RangeInclusive<i64>) -> Result<(), ApiError> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(ApiError::bad_request(format!(
        "{field} must be between {} and {}",
        range.start(),
        range.end()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_characters() {
        assert!(length("name", "héllo", 1..=5).is_ok());
        assert!(length("name", "", 1..=5).is_err());
        assert!(length("name", "toolong", 1..=5).is_err());
    }

    #[test]
    fn username_rules() {
        assert!(alphanumeric("username", "alice42").is_ok());
        assert!(alphanumeric("username", "alice_42").is_err());
        assert!(alphanumeric("username", "").is_err());
    }

    #[test]
    fn email_needs_at_sign() {
        assert!(email(None).is_ok());
        assert!(email(Some("a@b.ca")).is_ok());
        assert!(email(Some("ab.ca")).is_err());
    }

    #[test]
    fn capacity_bounds() {
        assert!(in_range("capacity", 0, 0..=2000).is_ok());
        assert!(in_range("capacity", 2001, 0..=2000).is_err());
    }
}
