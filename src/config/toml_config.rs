use crate::core::availability::ServingRadiusPolicy;
use crate::core::cache_aside::CacheSettings;
use crate::core::discovery::DiscoverySettings;
use crate::core::geohash::MAX_PRECISION;
use crate::core::matcher::SearchLimits;
use crate::domain::model::{parse_wall_clock, OperatingWindow};
use crate::utils::error::{DiscoveryError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub cache: CacheSettings,
    pub search: SearchLimits,
    pub serving: ServingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServingConfig {
    pub normal_radius_km: f64,
    pub peak_radius_km: f64,
    /// `[opens, closes]` pairs in `HH:MM`.
    pub peak_hours: Vec<[String; 2]>,
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            normal_radius_km: 5.0,
            peak_radius_km: 3.0,
            peak_hours: vec![
                ["08:00".to_string(), "10:00".to_string()],
                ["13:00".to_string(), "14:00".to_string()],
                ["19:00".to_string(), "21:00".to_string()],
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> DiscoveryError {
    DiscoveryError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

impl DiscoveryConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let config: Self = toml::from_str(&processed_content).map_err(|e| {
            DiscoveryError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DiscoveryError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn discovery_settings(&self) -> DiscoverySettings {
        DiscoverySettings {
            cache: self.cache.clone(),
            search: self.search,
        }
    }

    pub fn serving_policy(&self) -> Result<ServingRadiusPolicy> {
        let peak_windows = self
            .serving
            .peak_hours
            .iter()
            .map(|[opens, closes]| {
                Ok(OperatingWindow::new(
                    parse_wall_clock("serving.peak_hours", opens)?,
                    parse_wall_clock("serving.peak_hours", closes)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ServingRadiusPolicy {
            normal_radius_km: self.serving.normal_radius_km,
            peak_radius_km: self.serving.peak_radius_km,
            peak_windows,
        })
    }
}

impl Validate for DiscoveryConfig {
    fn validate(&self) -> Result<()> {
        let cache = &self.cache;
        if cache.precision == 0 || cache.precision > MAX_PRECISION {
            return Err(invalid(
                "cache.precision",
                cache.precision,
                format!("Precision must be between 1 and {}", MAX_PRECISION),
            ));
        }
        if cache.ttl_seconds == 0 {
            return Err(invalid("cache.ttl_seconds", 0, "TTL must be at least 1 second"));
        }
        if cache.timeout_ms == 0 {
            return Err(invalid("cache.timeout_ms", 0, "Timeout must be at least 1ms"));
        }
        if cache.require_cache_for_proximity && !cache.enabled {
            return Err(invalid(
                "cache.require_cache_for_proximity",
                true,
                "Cannot require a cache that is disabled",
            ));
        }

        let search = &self.search;
        if search.max_query_length == 0 {
            return Err(invalid("search.max_query_length", 0, "Must be at least 1"));
        }
        if search.max_tokens == 0 {
            return Err(invalid("search.max_tokens", 0, "Must be at least 1"));
        }
        if search.regex_size_limit < 1024 {
            return Err(invalid(
                "search.regex_size_limit",
                search.regex_size_limit,
                "Must be at least 1024 bytes",
            ));
        }

        for (field, radius) in [
            ("serving.normal_radius_km", self.serving.normal_radius_km),
            ("serving.peak_radius_km", self.serving.peak_radius_km),
        ] {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(invalid(field, radius, "Radius must be greater than 0"));
            }
        }

        let policy = self.serving_policy().map_err(|e| {
            invalid("serving.peak_hours", format!("{:?}", self.serving.peak_hours), e.to_string())
        })?;
        for window in &policy.peak_windows {
            if window.opens_at > window.closes_at {
                return Err(invalid(
                    "serving.peak_hours",
                    format!("{}-{}", window.opens_at, window.closes_at),
                    "Peak window must not cross midnight",
                ));
            }
        }

        Ok(())
    }
}
