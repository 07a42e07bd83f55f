//! The mapping registry: an explicitly owned metadata provider.

use std::any::{Any, TypeId};
use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::error::{SchemaError, SchemaResult};
use crate::mapping::{ClassMetadata, EntityMapping};

/// Source of per-type entity metadata.
pub trait MetadataProvider: Send + Sync {
    /// Get the metadata registered for a Rust type.
    fn class_metadata(&self, entity: TypeId) -> Option<Arc<ClassMetadata>>;

    /// Get the metadata registered under an entity name.
    fn class_metadata_by_name(&self, name: &str) -> Option<Arc<ClassMetadata>>;
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for &P {
    fn class_metadata(&self, entity: TypeId) -> Option<Arc<ClassMetadata>> {
        (**self).class_metadata(entity)
    }

    fn class_metadata_by_name(&self, name: &str) -> Option<Arc<ClassMetadata>> {
        (**self).class_metadata_by_name(name)
    }
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for Arc<P> {
    fn class_metadata(&self, entity: TypeId) -> Option<Arc<ClassMetadata>> {
        (**self).class_metadata(entity)
    }

    fn class_metadata_by_name(&self, name: &str) -> Option<Arc<ClassMetadata>> {
        (**self).class_metadata_by_name(name)
    }
}

/// Immutable set of entity mappings.
///
/// Built once with [`MappingRegistry::builder`] and shared by `Arc`.
#[derive(Debug, Default, Clone)]
pub struct MappingRegistry {
    by_type: IndexMap<TypeId, Arc<ClassMetadata>>,
    by_name: IndexMap<SmolStr, TypeId>,
}

impl MappingRegistry {
    /// Start building a registry.
    pub fn builder() -> MappingRegistryBuilder {
        MappingRegistryBuilder {
            registry: Self::default(),
        }
    }

    /// Get the metadata for entity type `E`.
    pub fn get<E: Any>(&self) -> Option<&Arc<ClassMetadata>> {
        self.by_type.get(&TypeId::of::<E>())
    }

    /// Get the metadata registered under an entity name.
    pub fn get_by_name(&self, name: &str) -> Option<&Arc<ClassMetadata>> {
        self.by_name
            .get(name)
            .and_then(|type_id| self.by_type.get(type_id))
    }

    /// Check whether entity type `E` is registered.
    pub fn contains<E: Any>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<E>())
    }

    /// Get the registered entity names in registration order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(SmolStr::as_str)
    }

    /// Get the number of registered entities.
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    /// Check if no entity is registered.
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl MetadataProvider for MappingRegistry {
    fn class_metadata(&self, entity: TypeId) -> Option<Arc<ClassMetadata>> {
        self.by_type.get(&entity).cloned()
    }

    fn class_metadata_by_name(&self, name: &str) -> Option<Arc<ClassMetadata>> {
        self.get_by_name(name).cloned()
    }
}

/// Builder for [`MappingRegistry`].
#[derive(Debug, Default)]
pub struct MappingRegistryBuilder {
    registry: MappingRegistry,
}

impl MappingRegistryBuilder {
    /// Validate and register an entity mapping.
    pub fn register<E: Any>(self, mapping: EntityMapping<E>) -> SchemaResult<Self> {
        self.register_metadata(mapping.build()?)
    }

    /// Register already-built metadata.
    pub fn register_metadata(mut self, metadata: ClassMetadata) -> SchemaResult<Self> {
        let type_id = metadata.type_id();
        if self.registry.by_type.contains_key(&type_id) {
            return Err(SchemaError::duplicate_entity(metadata.type_name()));
        }
        if self.registry.by_name.contains_key(metadata.entity_name()) {
            return Err(SchemaError::duplicate_entity(metadata.entity_name()));
        }

        debug!(
            entity = metadata.entity_name(),
            identifier = metadata.identifier_property_name(),
            properties = metadata.property_names().len(),
            "Registered entity mapping"
        );

        self.registry
            .by_name
            .insert(SmolStr::from(metadata.entity_name()), type_id);
        self.registry.by_type.insert(type_id, Arc::new(metadata));
        Ok(self)
    }

    /// Finish the registry.
    pub fn build(self) -> MappingRegistry {
        self.registry
    }
}
