use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::server::response::ApiError;

const MAX_CLASS_NAME_LEN: usize = 100;
const MAX_TEXT_LEN: usize = 2000;

pub fn validate_id(field: &str, id: i64) -> Result<i64, ApiError> {
    if id <= 0 {
        return Err(ApiError::bad_request(format!(
            "{field} must be a positive integer"
        )));
    }
    Ok(id)
}

/// Trims a class name and rejects empty or oversized names.
pub fn validate_class_name(name: Option<&str>) -> Result<String, ApiError> {
    let name = name.map(str::trim).unwrap_or("");
    if name.is_empty() {
        return Err(ApiError::bad_request("Class name required"));
    }
    if name.chars().count() > MAX_CLASS_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Class name cannot exceed {MAX_CLASS_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

pub fn require<T>(field: &str, value: Option<T>) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::bad_request(format!("{field} required")))
}

/// A required free-text field; blank counts as missing.
pub fn require_text(field: &str, value: Option<String>) -> Result<String, ApiError> {
    let text = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let text = require(field, text)?;
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(ApiError::bad_request(format!(
            "{field} cannot exceed {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(text)
}

/// Optional free text; blank becomes `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A calendar date, or a full timestamp whose date part is kept.
pub fn require_date(field: &str, value: Option<String>) -> Result<NaiveDate, ApiError> {
    let raw = require_text(field, value)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.date_naive()))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date())
        })
        .map_err(|_| ApiError::bad_request(format!("{field} must be a date (YYYY-MM-DD)")))
}

pub fn validate_day_of_week(day: i64) -> Result<i64, ApiError> {
    if !(1..=7).contains(&day) {
        return Err(ApiError::bad_request("day_of_week must be between 1 and 7"));
    }
    Ok(day)
}
