//! Entity mappings: the registered description of one entity type.
//!
//! A mapping names the entity, declares its identifier and lists its
//! persistent properties in order. Each property carries an extractor that
//! reads the current value from an instance.
//!
//! ```rust
//! use exemplar_schema::{Column, EntityMapping, ScalarType, Value};
//!
//! struct Account {
//!     username: Option<String>,
//!     password: Option<String>,
//!     logins: i32,
//! }
//!
//! let metadata = EntityMapping::<Account>::new("Account")
//!     .id("username", ScalarType::String, |a: &Account| a.username.clone().map(Value::from))
//!     .property(Column::scalar("password", ScalarType::String), |a: &Account| {
//!         a.password.clone().map(Value::from)
//!     })
//!     .property(Column::scalar("logins", ScalarType::Int).not_null(), |a: &Account| {
//!         Some(Value::from(a.logins))
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(metadata.property_names(), vec!["password", "logins"]);
//! assert_eq!(metadata.property_nullability(), vec![true, false]);
//! ```

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexSet;
use smol_str::SmolStr;

use crate::component::ComponentDescriptor;
use crate::error::{SchemaError, SchemaResult};
use crate::types::{ScalarType, TypeKind};
use crate::value::{ComponentValue, Value};

type Extractor = Arc<dyn Fn(&dyn Any) -> Option<Option<Value>> + Send + Sync>;

fn erase<E, F>(extractor: F) -> Extractor
where
    E: Any,
    F: Fn(&E) -> Option<Value> + Send + Sync + 'static,
{
    Arc::new(move |entity: &dyn Any| entity.downcast_ref::<E>().map(|e| extractor(e)))
}

/// Storage description of one persistent property.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: SmolStr,
    kind: TypeKind,
    nullable: bool,
    lazy: bool,
}

impl Column {
    /// Create a nullable, eagerly loaded column.
    pub fn new(name: impl Into<SmolStr>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: true,
            lazy: false,
        }
    }

    /// Create a scalar column.
    pub fn scalar(name: impl Into<SmolStr>, scalar: ScalarType) -> Self {
        Self::new(name, TypeKind::Scalar(scalar))
    }

    /// Create an association to another entity.
    pub fn association(name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        Self::new(name, TypeKind::Association(target.into()))
    }

    /// Create an embedded component column.
    pub fn component(name: impl Into<SmolStr>, descriptor: Arc<ComponentDescriptor>) -> Self {
        Self::new(name, TypeKind::Composite(descriptor))
    }

    /// Create a collection column. Collections load lazily.
    pub fn collection(name: impl Into<SmolStr>, element: impl Into<SmolStr>) -> Self {
        Self::new(name, TypeKind::Collection(element.into())).lazy()
    }

    /// Mark the column as NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Set nullability explicitly.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Mark the column as lazily loaded.
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// Get the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the type classification.
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Check whether storage permits absence.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Check whether loading is deferred.
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }
}

struct PropertyMapping {
    column: Column,
    extractor: Extractor,
}

struct IdentifierMapping {
    name: SmolStr,
    kind: TypeKind,
    extractor: Extractor,
}

/// Builder describing how entity type `E` is persisted.
pub struct EntityMapping<E> {
    name: SmolStr,
    identifier: Option<IdentifierMapping>,
    properties: Vec<PropertyMapping>,
    _entity: PhantomData<fn(&E)>,
}

impl<E: Any> EntityMapping<E> {
    /// Start a mapping for an entity name.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            identifier: None,
            properties: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Declare a single-column scalar identifier.
    pub fn id<F>(self, name: impl Into<SmolStr>, scalar: ScalarType, extractor: F) -> Self
    where
        F: Fn(&E) -> Option<Value> + Send + Sync + 'static,
    {
        self.identifier(name, TypeKind::Scalar(scalar), extractor)
    }

    /// Declare a composite identifier whose value is a registered component.
    pub fn composite_id<C, F>(
        self,
        name: impl Into<SmolStr>,
        descriptor: Arc<ComponentDescriptor>,
        extractor: F,
    ) -> Self
    where
        C: Any + Send + Sync,
        F: Fn(&E) -> Option<C> + Send + Sync + 'static,
    {
        let kind = TypeKind::Composite(Arc::clone(&descriptor));
        self.identifier(name, kind, move |e: &E| {
            extractor(e).map(|key| Value::Component(ComponentValue::new(Arc::clone(&descriptor), key)))
        })
    }

    /// Declare an identifier with an explicit classification.
    pub fn identifier<F>(mut self, name: impl Into<SmolStr>, kind: TypeKind, extractor: F) -> Self
    where
        F: Fn(&E) -> Option<Value> + Send + Sync + 'static,
    {
        self.identifier = Some(IdentifierMapping {
            name: name.into(),
            kind,
            extractor: erase(extractor),
        });
        self
    }

    /// Append a persistent property.
    pub fn property<F>(mut self, column: Column, extractor: F) -> Self
    where
        F: Fn(&E) -> Option<Value> + Send + Sync + 'static,
    {
        self.properties.push(PropertyMapping {
            column,
            extractor: erase(extractor),
        });
        self
    }

    /// Append an embedded component property.
    pub fn embedded<C, F>(
        self,
        name: impl Into<SmolStr>,
        descriptor: Arc<ComponentDescriptor>,
        extractor: F,
    ) -> Self
    where
        C: Any + Send + Sync,
        F: Fn(&E) -> Option<C> + Send + Sync + 'static,
    {
        let column = Column::component(name, Arc::clone(&descriptor));
        self.property(column, move |e: &E| {
            extractor(e).map(|c| Value::Component(ComponentValue::new(Arc::clone(&descriptor), c)))
        })
    }

    /// Validate the mapping and produce its metadata.
    pub fn build(self) -> SchemaResult<ClassMetadata> {
        if self.name.is_empty() {
            return Err(SchemaError::invalid_mapping(
                type_name::<E>(),
                "entity name must not be empty",
            ));
        }

        let identifier = self
            .identifier
            .ok_or_else(|| SchemaError::missing_identifier(self.name.as_str()))?;
        if identifier.name.is_empty() {
            return Err(SchemaError::invalid_mapping(
                self.name.as_str(),
                "identifier name must not be empty",
            ));
        }

        let mut seen = IndexSet::with_capacity(self.properties.len() + 1);
        seen.insert(identifier.name.clone());
        for property in &self.properties {
            if property.column.name.is_empty() {
                return Err(SchemaError::invalid_mapping(
                    self.name.as_str(),
                    "property names must not be empty",
                ));
            }
            if !seen.insert(property.column.name.clone()) {
                return Err(SchemaError::duplicate_property(
                    self.name.as_str(),
                    property.column.name.as_str(),
                ));
            }
        }

        Ok(ClassMetadata {
            entity_name: self.name,
            type_id: TypeId::of::<E>(),
            type_name: type_name::<E>(),
            identifier,
            properties: self.properties,
        })
    }
}

/// Validated metadata for one entity type.
pub struct ClassMetadata {
    entity_name: SmolStr,
    type_id: TypeId,
    type_name: &'static str,
    identifier: IdentifierMapping,
    properties: Vec<PropertyMapping>,
}

impl ClassMetadata {
    /// Get the entity name.
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Get the `TypeId` of the mapped Rust type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Get the Rust type name of the mapped type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Get the property columns in mapping order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.properties.iter().map(|p| &p.column)
    }

    /// Get the property names in mapping order.
    pub fn property_names(&self) -> Vec<&str> {
        self.columns().map(Column::name).collect()
    }

    /// Get the property classifications in mapping order.
    pub fn property_types(&self) -> Vec<&TypeKind> {
        self.columns().map(Column::kind).collect()
    }

    /// Get the property nullability flags in mapping order.
    pub fn property_nullability(&self) -> Vec<bool> {
        self.columns().map(Column::is_nullable).collect()
    }

    /// Get the property laziness flags in mapping order.
    pub fn property_laziness(&self) -> Vec<bool> {
        self.columns().map(Column::is_lazy).collect()
    }

    /// Get the identifier property name.
    pub fn identifier_property_name(&self) -> &str {
        &self.identifier.name
    }

    /// Get the identifier classification.
    pub fn identifier_type(&self) -> &TypeKind {
        &self.identifier.kind
    }

    /// Check whether `entity` is an instance of the mapped type.
    pub fn is_instance(&self, entity: &dyn Any) -> bool {
        entity.type_id() == self.type_id
    }

    /// Read every property value, aligned with [`property_names`](Self::property_names).
    ///
    /// Returns `None` when `entity` is not an instance of the mapped type.
    pub fn property_values(&self, entity: &dyn Any) -> Option<Vec<Option<Value>>> {
        self.properties
            .iter()
            .map(|p| (p.extractor)(entity))
            .collect()
    }

    /// Read the identifier value.
    ///
    /// Returns `None` when `entity` is not an instance of the mapped type.
    pub fn identifier_value(&self, entity: &dyn Any) -> Option<Option<Value>> {
        (self.identifier.extractor)(entity)
    }
}

impl fmt::Debug for ClassMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMetadata")
            .field("entity_name", &self.entity_name)
            .field("type_name", &self.type_name)
            .field("identifier", &self.identifier.name)
            .field("identifier_type", &self.identifier.kind)
            .field("properties", &self.columns().collect::<Vec<_>>())
            .finish()
    }
}
