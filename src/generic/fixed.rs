//! Fixed-size byte values.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::GenericError;
use crate::schema::FixedSchema;

/// Bytes whose length always equals the schema size.
#[derive(Debug, Clone)]
pub struct Fixed {
    schema: Arc<FixedSchema>,
    bytes: Box<[u8]>,
}

impl Fixed {
    /// Zero-filled value of the schema size.
    pub fn new(schema: Arc<FixedSchema>) -> Self {
        let bytes = vec![0u8; schema.size].into_boxed_slice();
        Self { schema, bytes }
    }

    /// Value holding a copy of `bytes`.
    pub fn from_bytes(schema: Arc<FixedSchema>, bytes: &[u8]) -> Result<Self, GenericError> {
        check_size(&schema, bytes.len())?;
        Ok(Self {
            schema,
            bytes: bytes.into(),
        })
    }

    pub fn schema(&self) -> &Arc<FixedSchema> {
        &self.schema
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Overwrite the content in place.
    pub fn copy_from(&mut self, bytes: &[u8]) -> Result<(), GenericError> {
        check_size(&self.schema, bytes.len())?;
        self.bytes.copy_from_slice(bytes);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn check_size(schema: &FixedSchema, actual: usize) -> Result<(), GenericError> {
    if actual != schema.size {
        return Err(GenericError::FixedSizeMismatch {
            name: schema.fullname(),
            expected: schema.size,
            actual,
        });
    }
    Ok(())
}

impl PartialEq for Fixed {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Fixed {}

impl PartialOrd for Fixed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fixed {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

impl Hash for Fixed {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.bytes)
    }
}
