use crate::utils::error::{DiscoveryError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // Written so that NaN fails the check as well.
    if !(value >= min && value <= max) {
        return Err(DiscoveryError::validation(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_latitude(field_name: &str, latitude: f64) -> Result<()> {
    validate_range(field_name, latitude, -90.0, 90.0)
}

pub fn validate_longitude(field_name: &str, longitude: f64) -> Result<()> {
    validate_range(field_name, longitude, -180.0, 180.0)
}

pub fn validate_positive_distance(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DiscoveryError::validation(
            field_name,
            value,
            "Value must be a finite number greater than 0",
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DiscoveryError::validation(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// Bounds untrusted search text before any pattern is compiled from it.
/// Returns the trimmed text.
pub fn validate_search_text(text: &str, max_length: usize, max_tokens: usize) -> Result<&str> {
    let trimmed = text.trim();
    validate_non_empty_string("search_string", trimmed)?;

    let length = trimmed.chars().count();
    if length > max_length {
        return Err(DiscoveryError::validation(
            "search_string",
            trimmed,
            format!("Search text is {} characters, limit is {}", length, max_length),
        ));
    }

    let tokens = trimmed.split_whitespace().count();
    if tokens > max_tokens {
        return Err(DiscoveryError::validation(
            "search_string",
            trimmed,
            format!("Search text has {} terms, limit is {}", tokens, max_tokens),
        ));
    }

    Ok(trimmed)
}
