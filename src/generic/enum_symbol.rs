//! Enum symbols.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::GenericError;
use crate::schema::EnumSchema;

/// A symbol of an enum schema.
///
/// Aliases are resolved when the symbol is created, so the stored symbol is
/// always one of the declared ones.
#[derive(Debug, Clone)]
pub struct EnumSymbol {
    schema: Arc<EnumSchema>,
    symbol: String,
    ordinal: usize,
}

impl EnumSymbol {
    /// Symbol `symbol` (or an alias of it) of `schema`.
    pub fn new(schema: Arc<EnumSchema>, symbol: &str) -> Result<Self, GenericError> {
        let (symbol, ordinal) = match schema.resolve_symbol(symbol) {
            Some(declared) => match schema.symbol_index(declared) {
                Some(ordinal) => (declared.to_string(), ordinal),
                None => return Err(unknown(&schema, symbol)),
            },
            None => return Err(unknown(&schema, symbol)),
        };
        Ok(Self {
            schema,
            symbol,
            ordinal,
        })
    }

    /// Symbol named by anything printable, such as another enum's symbol.
    pub fn from_display(schema: Arc<EnumSchema>, symbol: impl fmt::Display) -> Result<Self, GenericError> {
        Self::new(schema, &symbol.to_string())
    }

    /// Symbol at position `ordinal`.
    pub fn from_ordinal(schema: Arc<EnumSchema>, ordinal: usize) -> Result<Self, GenericError> {
        let symbol = schema
            .symbols
            .get(ordinal)
            .cloned()
            .ok_or(GenericError::IndexOutOfBounds {
                index: ordinal,
                len: schema.symbols.len(),
            })?;
        Ok(Self {
            schema,
            symbol,
            ordinal,
        })
    }

    pub fn schema(&self) -> &Arc<EnumSchema> {
        &self.schema
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Position of the symbol in the declaration.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}

fn unknown(schema: &EnumSchema, symbol: &str) -> GenericError {
    GenericError::UnknownEnumSymbol {
        name: schema.fullname(),
        symbol: symbol.to_string(),
    }
}

impl PartialEq for EnumSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for EnumSymbol {}

impl PartialOrd for EnumSymbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        // Ordinals of different enums are not comparable.
        if !Arc::ptr_eq(&self.schema, &other.schema) && self.schema != other.schema {
            return None;
        }
        Some(self.ordinal.cmp(&other.ordinal))
    }
}

impl Hash for EnumSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}

impl fmt::Display for EnumSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}
