//! Registered conversions, keyed by logical type name.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::GenericConfig;
use crate::error::GenericError;
use crate::generic::ValueKind;
use crate::logical::{
    Conversion, DateConversion, DecimalConversion, TimestampMicrosConversion,
    TimestampMillisConversion, UuidConversion,
};
use crate::schema::LogicalType;

/// Logical type name to conversion lookup.
///
/// At most one conversion is registered per name. The registry is mutated
/// only through `&mut self`, so an engine that is shared between threads
/// is never observed half-configured.
#[derive(Debug, Clone, Default)]
pub struct ConversionRegistry {
    by_name: HashMap<String, Arc<dyn Conversion>>,
}

impl ConversionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in conversions with default settings.
    pub fn with_defaults() -> Self {
        Self::from_config(&GenericConfig::default())
    }

    /// Registry holding the built-in conversions: decimal (using the
    /// configured rounding defaults), date, timestamp-millis,
    /// timestamp-micros and uuid.
    pub fn from_config(config: &GenericConfig) -> Self {
        let builtins: [Arc<dyn Conversion>; 5] = [
            Arc::new(DecimalConversion::new(
                config.default_ser_rounding,
                config.default_deser_rounding,
            )),
            Arc::new(DateConversion),
            Arc::new(TimestampMillisConversion),
            Arc::new(TimestampMicrosConversion),
            Arc::new(UuidConversion),
        ];
        let by_name = builtins
            .into_iter()
            .map(|conversion| (conversion.logical_type_name().to_string(), conversion))
            .collect();
        Self { by_name }
    }

    /// Add a conversion.
    ///
    /// # Errors
    /// `DuplicateConversion` if one is already registered for the same
    /// logical type name.
    pub fn register(&mut self, conversion: Arc<dyn Conversion>) -> Result<(), GenericError> {
        let name = conversion.logical_type_name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(GenericError::DuplicateConversion(name));
        }
        debug!(logical_type = %name, kind = %conversion.converted_kind(), "Registered conversion");
        self.by_name.insert(name, conversion);
        Ok(())
    }

    /// Remove and return the conversion for `name`.
    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Conversion>> {
        self.by_name.remove(name)
    }

    /// Remove every conversion.
    pub fn clear(&mut self) {
        self.by_name.clear();
    }

    /// Conversion registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Conversion>> {
        self.by_name.get(name)
    }

    /// Conversion serving `logical`.
    pub fn get_for(&self, logical: &LogicalType) -> Option<&Arc<dyn Conversion>> {
        self.get(logical.name())
    }

    /// Conversion serving `logical` whose host values are of `kind`.
    ///
    /// A miss is `None`, never an error.
    pub fn get_by_kind(&self, kind: ValueKind, logical: &LogicalType) -> Option<&Arc<dyn Conversion>> {
        self.get_for(logical)
            .filter(|conversion| conversion.converted_kind() == kind)
    }

    /// All registered conversions, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Conversion>> {
        self.by_name.values()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
