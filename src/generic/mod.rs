//! Generic values and the schema-directed operations over them.
//!
//! # Submodules
//! - `value`: the [`Value`] enum and its variant tags
//! - `record`, `array`, `fixed`, `enum_symbol`, `utf8`: the container and
//!   named value types
//! - `data`: the [`GenericData`] engine, union resolution and validation
//! - `compare`: ordering, equality and hashing
//! - `render`: JSON-like `to_string`
//! - `copy`: deep copies
//! - `induce`: schema inference
//! - `defaults`: field default materialization and its cache
//! - `datum`: reading and writing values through the io traits
//! - `block`: compressed blocks of encoded values

mod array;
pub mod block;
mod compare;
mod copy;
mod data;
mod datum;
mod defaults;
mod enum_symbol;
mod fixed;
mod induce;
mod record;
mod render;
mod utf8;
mod value;

pub use array::Array;
pub use block::{read_block, write_block};
pub use compare::{decimal_hash, hash_bytes, hash_double, hash_float, hash_long, host_hash};
pub use data::GenericData;
pub use datum::{GenericDatumReader, GenericDatumWriter};
pub use defaults::DefaultValueCache;
pub use enum_symbol::EnumSymbol;
pub use fixed::Fixed;
pub use record::Record;
pub use utf8::Utf8;
pub use value::{Value, ValueKind};
