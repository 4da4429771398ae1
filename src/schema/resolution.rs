//! Named type lookup.
//!
//! Code that walks a schema without a value in hand (decoders, the binary
//! comparator, default materialization) meets `AvroSchema::Named`
//! references and follows them through a [`SchemaResolutionContext`].

use std::collections::HashMap;

use crate::error::SchemaError;
use crate::schema::AvroSchema;

/// Named types of one schema tree, by full name.
#[derive(Debug, Clone, Default)]
pub struct SchemaResolutionContext {
    named_types: HashMap<String, AvroSchema>,
}

impl SchemaResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a definition.
    pub fn register(&mut self, fullname: impl Into<String>, schema: AvroSchema) {
        self.named_types.insert(fullname.into(), schema);
    }

    pub fn get(&self, fullname: &str) -> Option<&AvroSchema> {
        self.named_types.get(fullname)
    }

    pub fn contains(&self, fullname: &str) -> bool {
        self.named_types.contains_key(fullname)
    }

    /// Context holding every record, enum and fixed defined in `schema`.
    pub fn build_from_schema(schema: &AvroSchema) -> Self {
        let mut context = Self::new();
        context.extract_named_types(schema);
        context
    }

    /// Register the definitions found in `schema`. The first definition of
    /// a name wins, which also stops the walk at recursive records.
    pub fn extract_named_types(&mut self, schema: &AvroSchema) {
        let mut pending = vec![schema];
        while let Some(next) = pending.pop() {
            if next.is_named() {
                let Some(fullname) = next.fullname() else { continue };
                if self.contains(&fullname) {
                    continue;
                }
                self.named_types.insert(fullname, next.clone());
            }
            match next {
                AvroSchema::Record(record) => pending.extend(record.fields.iter().map(|f| &f.schema)),
                AvroSchema::Array(inner) | AvroSchema::Map(inner) => pending.push(inner.as_ref()),
                AvroSchema::Union(members) => pending.extend(members),
                AvroSchema::Logical(logical) => pending.push(logical.base.as_ref()),
                _ => {}
            }
        }
    }

    /// The definition behind a `Named` reference; any other schema is its
    /// own resolution.
    pub fn resolve<'a>(&'a self, schema: &'a AvroSchema) -> Result<&'a AvroSchema, SchemaError> {
        let AvroSchema::Named(fullname) = schema else {
            return Ok(schema);
        };
        self.get(fullname)
            .ok_or_else(|| SchemaError::InvalidSchema(format!("Unresolved named type reference: '{fullname}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumSchema, FieldSchema, FixedSchema, RecordSchema};
    use std::sync::Arc;

    #[test]
    fn test_collects_nested_definitions() {
        let color = EnumSchema::new("Color", vec!["RED".into(), "BLUE".into()]).with_namespace("shop");
        let digest = FixedSchema::new("Digest", 32).with_namespace("shop");
        let item = RecordSchema::new(
            "Item",
            vec![
                FieldSchema::new("color", AvroSchema::Enum(Arc::new(color))),
                FieldSchema::new(
                    "digests",
                    AvroSchema::Map(Box::new(AvroSchema::Fixed(Arc::new(digest)))),
                ),
            ],
        )
        .with_namespace("shop");

        let context = SchemaResolutionContext::build_from_schema(&AvroSchema::Record(Arc::new(item)));
        for name in ["shop.Item", "shop.Color", "shop.Digest"] {
            assert!(context.contains(name), "{name} missing");
        }
    }

    #[test]
    fn test_resolve_recursive_reference() {
        let node = RecordSchema::new(
            "Node",
            vec![FieldSchema::new(
                "next",
                AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::Named("Node".into())]),
            )],
        );
        let schema = AvroSchema::Record(Arc::new(node));
        let context = SchemaResolutionContext::build_from_schema(&schema);

        assert_eq!(context.resolve(&AvroSchema::Named("Node".into())).unwrap(), &schema);
        assert_eq!(context.resolve(&AvroSchema::Int).unwrap(), &AvroSchema::Int);
        assert!(SchemaResolutionContext::new()
            .resolve(&AvroSchema::Named("Missing".into()))
            .is_err());
    }

    #[test]
    fn test_register_overrides() {
        let mut context = SchemaResolutionContext::new();
        context.register("Id", AvroSchema::Fixed(Arc::new(FixedSchema::new("Id", 4))));
        context.register("Id", AvroSchema::Fixed(Arc::new(FixedSchema::new("Id", 8))));
        assert!(matches!(context.get("Id"), Some(AvroSchema::Fixed(f)) if f.size == 8));
    }
}
