use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde_json::Value as JsonValue;

use crate::error::StoreError;
use crate::model::entity::{Entity, CLASS_TAG};
use crate::model::registry::EntityRegistry;

// ---------------------------------------------------------------------------
// Object store
// ---------------------------------------------------------------------------

/// The keyed collection of all live entities plus its JSON-file mirror.
///
/// Keys are `"<Variant>.<id>"`. Persist rewrites the whole file from the
/// current map; load rebuilds the map from the file through the registry.
pub struct ObjectStore {
    path: PathBuf,
    objects: IndexMap<String, Entity>,
}

impl ObjectStore {
    pub fn new(path: &Path) -> ObjectStore {
        ObjectStore {
            path: path.to_path_buf(),
            objects: IndexMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn key(variant: &str, id: &str) -> String {
        format!("{}.{}", variant, id)
    }

    /// Insert or overwrite by the entity's own key.
    pub fn register(&mut self, entity: Entity) {
        self.objects.insert(entity.key(), entity);
    }

    pub fn lookup(&self, variant: &str, id: &str) -> Option<&Entity> {
        self.objects.get(&ObjectStore::key(variant, id))
    }

    pub fn lookup_mut(&mut self, variant: &str, id: &str) -> Option<&mut Entity> {
        self.objects.get_mut(&ObjectStore::key(variant, id))
    }

    /// Remove by key, preserving the order of the remaining entries.
    pub fn remove(&mut self, variant: &str, id: &str) -> Option<Entity> {
        self.objects.shift_remove(&ObjectStore::key(variant, id))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Live entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.objects.values()
    }

    /// Number of live entities of one variant.
    pub fn count_of(&self, variant: &str) -> usize {
        self.objects
            .values()
            .filter(|e| e.variant() == variant)
            .count()
    }

    /// Serialize the whole map and overwrite the backing file.
    pub fn persist(&self) -> Result<(), StoreError> {
        let mut document: IndexMap<String, IndexMap<String, JsonValue>> = IndexMap::new();
        for (key, entity) in &self.objects {
            document.insert(key.clone(), entity.to_record());
        }
        let encoded = serde_json::to_string_pretty(&document)
            .map_err(|e| StoreError::Malformed(format!("cannot encode store: {}", e)))?;
        fs::write(&self.path, encoded)?;
        debug!(
            "persisted {} entities to {}",
            self.objects.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Rebuild the map from the backing file. A missing file is a no-op, not
    /// an error.
    pub fn load(&mut self, registry: &EntityRegistry) -> Result<(), StoreError> {
        if !self.path.exists() {
            debug!("no backing file at {}, starting empty", self.path.display());
            return Ok(());
        }
        let text = fs::read_to_string(&self.path)?;
        let document: IndexMap<String, IndexMap<String, JsonValue>> =
            serde_json::from_str(&text)
                .map_err(|e| StoreError::Malformed(format!("{}: {}", self.path.display(), e)))?;

        for (key, record) in document {
            let tag = record
                .get(CLASS_TAG)
                .and_then(JsonValue::as_str)
                .ok_or_else(|| {
                    StoreError::Malformed(format!("entry '{}' lacks a {} tag", key, CLASS_TAG))
                })?
                .to_string();
            let schema = registry
                .resolve(&tag)
                .ok_or(StoreError::UnknownVariant(tag))?;
            let entity = schema.construct_from(record)?;
            // Keys are recomputed from the record, never trusted from the file.
            if entity.key() != key {
                warn!("entry '{}' stored under recomputed key '{}'", key, entity.key());
            }
            self.register(entity);
        }
        info!(
            "loaded {} entities from {}",
            self.objects.len(),
            self.path.display()
        );
        Ok(())
    }
}
