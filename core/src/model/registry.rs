use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::error::StoreError;
use crate::model::coerce;
use crate::model::entity::{self, Entity, CLASS_TAG};
use crate::model::schema;
use crate::model::value::FieldValue;

// ---------------------------------------------------------------------------
// Variant schemas
// ---------------------------------------------------------------------------

/// Shape of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Int,
    Float,
    TextList,
}

impl FieldKind {
    /// Fallback for a declared field that was never assigned.
    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldKind::Text => FieldValue::Text(String::new()),
            FieldKind::Int => FieldValue::Int(0),
            FieldKind::Float => FieldValue::Float(0.0),
            FieldKind::TextList => FieldValue::List(Vec::new()),
        }
    }
}

/// One declared field of a variant.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// A variant name plus its declared fields.
#[derive(Debug)]
pub struct VariantSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl VariantSchema {
    /// Fresh entity of this variant.
    pub fn construct(&self) -> Entity {
        Entity::fresh(self.name)
    }

    /// Rebuild an entity of this variant from a stored record.
    ///
    /// Identity fields are pulled out and coerced, everything else lands in
    /// the attribute set as-is, and the discriminator tag is dropped.
    /// Missing identity fields are backfilled with fresh values.
    pub fn construct_from(
        &self,
        record: IndexMap<String, JsonValue>,
    ) -> Result<Entity, StoreError> {
        let mut id = None;
        let mut created_at = None;
        let mut updated_at = None;
        let mut attrs = IndexMap::new();

        for (field, value) in record {
            if field == CLASS_TAG {
                continue;
            }
            if field == entity::ID {
                id = Some(expect_text(&field, &value)?);
            } else if field == entity::CREATED_AT {
                created_at = Some(expect_timestamp(&value)?);
            } else if field == entity::UPDATED_AT {
                updated_at = Some(expect_timestamp(&value)?);
            } else {
                let decoded = FieldValue::from_json(&value).ok_or_else(|| {
                    StoreError::Malformed(format!("unsupported value for field '{}'", field))
                })?;
                attrs.insert(field, decoded);
            }
        }

        Ok(Entity::rehydrated(self.name, id, created_at, updated_at, attrs))
    }

    /// Default for a declared field, `None` when this variant does not
    /// declare it.
    pub fn default_of(&self, field: &str) -> Option<FieldValue> {
        self.fields
            .iter()
            .find(|spec| spec.name == field)
            .map(|spec| spec.kind.default_value())
    }
}

fn expect_text(field: &str, value: &JsonValue) -> Result<String, StoreError> {
    match value {
        JsonValue::String(s) => Ok(s.clone()),
        other => Err(StoreError::Malformed(format!(
            "field '{}' must be text, got {}",
            field, other
        ))),
    }
}

fn expect_timestamp(value: &JsonValue) -> Result<NaiveDateTime, StoreError> {
    let text = match value {
        JsonValue::String(s) => s.clone(),
        other => return Err(StoreError::BadTimestamp(other.to_string())),
    };
    coerce::parse_timestamp(&text).map_err(|_| StoreError::BadTimestamp(text))
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Closed lookup table from variant name to schema. The variant set is fixed
/// at construction and never extended at runtime.
pub struct EntityRegistry {
    variants: &'static [VariantSchema],
}

impl EntityRegistry {
    pub fn new(variants: &'static [VariantSchema]) -> EntityRegistry {
        EntityRegistry { variants }
    }

    /// Registry over the built-in variant set.
    pub fn builtin() -> EntityRegistry {
        EntityRegistry::new(schema::VARIANTS)
    }

    /// Exact, case-sensitive name lookup.
    pub fn resolve(&self, name: &str) -> Option<&'static VariantSchema> {
        let variants: &'static [VariantSchema] = self.variants;
        variants.iter().find(|schema| schema.name == name)
    }
}
