//! Client-side field checks run before any network call.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").ok());

static URL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/?#]+[^\s]*$").ok());

/// Fails unless `value` holds non-whitespace text.
pub fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation_field(field, format!("{field} is required")));
    }
    Ok(())
}

/// Fails unless an optional text value is present and non-blank.
pub fn require_opt(field: &str, value: Option<&str>) -> Result<()> {
    require(field, value.unwrap_or(""))
}

/// Fails unless `value` looks like an email address.
pub fn email(field: &str, value: &str) -> Result<()> {
    require(field, value)?;
    match EMAIL.as_ref() {
        Some(re) if re.is_match(value.trim()) => Ok(()),
        _ => Err(Error::validation_field(
            field,
            "please enter a valid email address",
        )),
    }
}

/// Fails if a non-blank `value` is not a URL with a scheme.
pub fn optional_url(field: &str, value: Option<&str>) -> Result<()> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(());
    };
    match URL.as_ref() {
        Some(re) if re.is_match(value) => Ok(()),
        _ => Err(Error::validation_field(
            field,
            "please enter a valid website URL",
        )),
    }
}

/// Fails if a present number is negative or not finite.
pub fn non_negative(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(Error::validation_field(
            field,
            format!("{field} must be a non-negative number"),
        )),
        _ => Ok(()),
    }
}

/// Fails unless `value` is strictly positive.
pub fn positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::validation_field(
            field,
            format!("{field} must be greater than 0"),
        ));
    }
    Ok(())
}
