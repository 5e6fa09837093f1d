use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Invalid {field} '{value}': {reason}")]
    ValidationError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Restaurant store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Cache unavailable: {message}")]
    CacheUnavailable { message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field} '{value}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl DiscoveryError {
    pub fn validation(field: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        DiscoveryError::ValidationError {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        DiscoveryError::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        DiscoveryError::CacheUnavailable {
            message: message.into(),
        }
    }

    /// True when the caller sent something unusable and retrying the same
    /// request cannot succeed.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DiscoveryError::ValidationError { .. })
    }
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message() {
        let err = DiscoveryError::validation("latitude", 91.5, "must be between -90 and 90");
        assert_eq!(
            err.to_string(),
            "Invalid latitude '91.5': must be between -90 and 90"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_store_error_is_not_client_error() {
        let err = DiscoveryError::store("connection refused");
        assert!(!err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Restaurant store unavailable: connection refused"
        );
    }
}
