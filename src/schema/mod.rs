//! Avro schema types and parsing.
//!
//! This module defines the Avro schema type system including primitives,
//! complex types and logical type annotations, the JSON schema parser, and
//! named type lookup.

mod parser;
mod resolution;
mod types;

pub use parser::{
    parse_schema, parse_schema_with_options, SchemaParser, DEFAULT_DECIMAL_PRECISION,
};
pub use resolution::SchemaResolutionContext;
pub use types::*;
