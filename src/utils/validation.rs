//! Validation utilities

use bigdecimal::BigDecimal;

use crate::types::*;

/// Validate that the B2C large threshold is positive
pub fn validate_threshold(threshold: &BigDecimal) -> GstReturnResult<()> {
    if *threshold <= BigDecimal::from(0) {
        Err(GstReturnError::ThresholdNotPositive(threshold.clone()))
    } else {
        Ok(())
    }
}

/// Require a text field, treating blank strings as missing
pub fn require_text(
    value: &Option<String>,
    field: &str,
    line_ref: &str,
) -> GstReturnResult<String> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(GstReturnError::MalformedLine(format!(
            "{}: missing required field '{}'",
            line_ref, field
        ))),
    }
}

/// Require a numeric field
pub fn require_amount(
    value: &Option<BigDecimal>,
    field: &str,
    line_ref: &str,
) -> GstReturnResult<BigDecimal> {
    value.clone().ok_or_else(|| {
        GstReturnError::MalformedLine(format!(
            "{}: missing required field '{}'",
            line_ref, field
        ))
    })
}

/// Reject negative amounts on fields that must be zero or more
pub fn validate_non_negative(
    value: &BigDecimal,
    field: &str,
    line_ref: &str,
) -> GstReturnResult<()> {
    if *value < BigDecimal::from(0) {
        return Err(GstReturnError::MalformedLine(format!(
            "{}: '{}' cannot be negative ({})",
            line_ref, field, value
        )));
    }
    Ok(())
}

/// Drop blank optional strings
pub fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
