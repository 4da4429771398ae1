//! Engine configuration.
//!
//! [`GenericConfig`] carries the process-wide decimal rounding defaults and
//! the default-value cache bound. It is built once, either with the builder
//! methods or from the environment, and handed to
//! [`GenericData::with_config`](crate::generic::GenericData::with_config).

use tracing::debug;

use crate::error::GenericError;
use crate::logical::RoundingMode;

/// Environment variable holding the default serialization rounding mode.
pub const ENV_DEFAULT_SER_ROUNDING: &str = "AVRO_DECIMAL_DEFAULT_SER_ROUNDING";
/// Environment variable holding the default deserialization rounding mode.
pub const ENV_DEFAULT_DESER_ROUNDING: &str = "AVRO_DECIMAL_DEFAULT_DESER_ROUNDING";
/// Environment variable holding the default-value cache capacity.
pub const ENV_DEFAULT_CACHE_CAPACITY: &str = "AVRO_DEFAULT_CACHE_CAPACITY";

/// Default number of materialized field defaults kept per engine.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Configuration for a [`GenericData`](crate::generic::GenericData) engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericConfig {
    /// Rounding applied when a decimal has more fraction digits than its
    /// schema allows on write and the schema sets no `serRounding`
    /// (default: none, which makes such writes fail).
    pub default_ser_rounding: Option<RoundingMode>,
    /// Rounding applied on read when the schema sets no `deserRounding`
    /// (default: none).
    pub default_deser_rounding: Option<RoundingMode>,
    /// Maximum number of cached field defaults (default: 1024).
    pub default_cache_capacity: usize,
}

impl Default for GenericConfig {
    fn default() -> Self {
        Self {
            default_ser_rounding: None,
            default_deser_rounding: None,
            default_cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl GenericConfig {
    /// Create a new GenericConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default serialization rounding mode.
    pub fn with_default_ser_rounding(mut self, mode: Option<RoundingMode>) -> Self {
        self.default_ser_rounding = mode;
        self
    }

    /// Set the default deserialization rounding mode.
    pub fn with_default_deser_rounding(mut self, mode: Option<RoundingMode>) -> Self {
        self.default_deser_rounding = mode;
        self
    }

    /// Set the default-value cache capacity.
    pub fn with_default_cache_capacity(mut self, capacity: usize) -> Self {
        self.default_cache_capacity = capacity;
        self
    }

    /// Load settings from the process environment.
    ///
    /// Unset variables keep their defaults. A variable that is set but
    /// cannot be parsed is a configuration error rather than being ignored.
    pub fn from_env() -> Result<Self, GenericError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GenericError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_DEFAULT_SER_ROUNDING) {
            config.default_ser_rounding = RoundingMode::parse_optional(&value)?;
        }
        if let Some(value) = lookup(ENV_DEFAULT_DESER_ROUNDING) {
            config.default_deser_rounding = RoundingMode::parse_optional(&value)?;
        }
        if let Some(value) = lookup(ENV_DEFAULT_CACHE_CAPACITY) {
            config.default_cache_capacity = value.trim().parse().map_err(|_| {
                GenericError::Configuration(format!(
                    "{} must be a non-negative integer, got '{}'",
                    ENV_DEFAULT_CACHE_CAPACITY, value
                ))
            })?;
        }

        debug!(
            ser_rounding = ?config.default_ser_rounding,
            deser_rounding = ?config.default_deser_rounding,
            cache_capacity = config.default_cache_capacity,
            "Loaded generic data configuration"
        );
        Ok(config)
    }
}
