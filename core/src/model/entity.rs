use std::fmt;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::model::coerce;
use crate::model::value::FieldValue;

/// Discriminator field stored with every persisted record. It never
/// materializes as a live attribute.
pub const CLASS_TAG: &str = "__class__";

pub(crate) const ID: &str = "id";
pub(crate) const CREATED_AT: &str = "created_at";
pub(crate) const UPDATED_AT: &str = "updated_at";

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// One live domain record: a variant name, the three universal fields, and
/// an ordered set of dynamically assigned attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    variant: &'static str,
    id: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    attrs: IndexMap<String, FieldValue>,
}

impl Entity {
    /// Fresh entity: new id, both timestamps set to the same instant, no
    /// attributes.
    pub(crate) fn fresh(variant: &'static str) -> Entity {
        let stamp = coerce::now();
        Entity {
            variant,
            id: Uuid::new_v4().to_string(),
            created_at: stamp,
            updated_at: stamp,
            attrs: IndexMap::new(),
        }
    }

    /// Rebuild an entity from stored values. Missing identity fields are
    /// backfilled with fresh ones rather than rejected.
    pub(crate) fn rehydrated(
        variant: &'static str,
        id: Option<String>,
        created_at: Option<NaiveDateTime>,
        updated_at: Option<NaiveDateTime>,
        attrs: IndexMap<String, FieldValue>,
    ) -> Entity {
        Entity {
            variant,
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            created_at: created_at.unwrap_or_else(coerce::now),
            updated_at: updated_at.unwrap_or_else(coerce::now),
            attrs,
        }
    }

    pub fn variant(&self) -> &'static str {
        self.variant
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    /// Store key, `"<Variant>.<id>"`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.variant, self.id)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.attrs.get(field)
    }

    /// Assign an attribute. The identity fields and the discriminator are
    /// owned by the entity lifecycle and silently skipped here.
    pub fn set(&mut self, field: &str, value: FieldValue) {
        if matches!(field, ID | CREATED_AT | UPDATED_AT | CLASS_TAG) {
            return;
        }
        self.attrs.insert(field.to_string(), value);
    }

    /// Refresh `updated_at` to the current instant.
    pub fn touch(&mut self) {
        self.updated_at = coerce::now();
    }

    /// Dynamically assigned attributes, in insertion order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Full field set for the backing file: identity fields first, then the
    /// live attributes, then the discriminator tag.
    pub fn to_record(&self) -> IndexMap<String, JsonValue> {
        let mut record = IndexMap::new();
        record.insert(ID.to_string(), JsonValue::String(self.id.clone()));
        record.insert(
            CREATED_AT.to_string(),
            JsonValue::String(coerce::format_timestamp(&self.created_at)),
        );
        record.insert(
            UPDATED_AT.to_string(),
            JsonValue::String(coerce::format_timestamp(&self.updated_at)),
        );
        for (name, value) in &self.attrs {
            record.insert(name.clone(), value.to_json());
        }
        record.insert(
            CLASS_TAG.to_string(),
            JsonValue::String(self.variant.to_string()),
        );
        record
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] ({}) {{id: {:?}, created_at: {}, updated_at: {}",
            self.variant,
            self.id,
            self.id,
            coerce::format_timestamp(&self.created_at),
            coerce::format_timestamp(&self.updated_at),
        )?;
        for (name, value) in &self.attrs {
            write!(f, ", {}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}
