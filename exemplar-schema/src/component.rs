//! Component descriptors for structured values such as composite keys.
//!
//! A component type is registered once with an explicit list of
//! `(sub-field name, accessor)` pairs:
//!
//! ```rust
//! use exemplar_schema::{ComponentDescriptor, Value};
//!
//! struct UserId {
//!     site: String,
//!     name: String,
//! }
//!
//! let descriptor = ComponentDescriptor::builder::<UserId>("UserId")
//!     .field("site", |id: &UserId| Some(Value::from(id.site.as_str())))
//!     .field("name", |id: &UserId| Some(Value::from(id.name.as_str())))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(descriptor.field_names(), vec!["site", "name"]);
//! ```

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexSet;
use smol_str::SmolStr;

use crate::error::{SchemaError, SchemaResult};
use crate::value::Value;

type Accessor = Arc<dyn Fn(&dyn Any) -> Option<Option<Value>> + Send + Sync>;

/// One sub-field of a component.
#[derive(Clone)]
pub struct ComponentField {
    name: SmolStr,
    accessor: Accessor,
}

impl ComponentField {
    /// Get the sub-field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the sub-field from a component instance.
    ///
    /// The outer `None` means `target` is not an instance of the component
    /// type; the inner option is the sub-field value itself.
    pub fn read(&self, target: &dyn Any) -> Option<Option<Value>> {
        (self.accessor)(target)
    }
}

impl fmt::Debug for ComponentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentField")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Describes the sub-fields of a component type.
pub struct ComponentDescriptor {
    name: SmolStr,
    type_id: TypeId,
    type_name: &'static str,
    fields: Vec<ComponentField>,
}

impl ComponentDescriptor {
    /// Start describing component type `C`.
    pub fn builder<C: Any>(name: impl Into<SmolStr>) -> ComponentDescriptorBuilder<C> {
        ComponentDescriptorBuilder {
            name: name.into(),
            fields: Vec::new(),
            _component: PhantomData,
        }
    }

    /// Get the component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the Rust type name of the described type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Get the sub-fields in declaration order.
    pub fn fields(&self) -> &[ComponentField] {
        &self.fields
    }

    /// Get the sub-field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(ComponentField::name).collect()
    }

    /// Look up a sub-field by name.
    pub fn field(&self, name: &str) -> Option<&ComponentField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Check whether `value` is an instance of the described type.
    pub fn is_instance(&self, value: &dyn Any) -> bool {
        value.type_id() == self.type_id
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("fields", &self.field_names())
            .finish()
    }
}

/// Builder for [`ComponentDescriptor`].
pub struct ComponentDescriptorBuilder<C> {
    name: SmolStr,
    fields: Vec<ComponentField>,
    _component: PhantomData<fn(&C)>,
}

impl<C: Any> ComponentDescriptorBuilder<C> {
    /// Register a sub-field and its accessor.
    pub fn field<F>(mut self, name: impl Into<SmolStr>, accessor: F) -> Self
    where
        F: Fn(&C) -> Option<Value> + Send + Sync + 'static,
    {
        let accessor: Accessor =
            Arc::new(move |target: &dyn Any| target.downcast_ref::<C>().map(|c| accessor(c)));
        self.fields.push(ComponentField {
            name: name.into(),
            accessor,
        });
        self
    }

    /// Validate and finish the descriptor.
    pub fn build(self) -> SchemaResult<Arc<ComponentDescriptor>> {
        if self.name.is_empty() {
            return Err(SchemaError::invalid_component(
                type_name::<C>(),
                "component name must not be empty",
            ));
        }
        if self.fields.is_empty() {
            return Err(SchemaError::invalid_component(
                self.name.as_str(),
                "a component needs at least one field",
            ));
        }

        let mut seen = IndexSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(SchemaError::invalid_component(
                    self.name.as_str(),
                    "field names must not be empty",
                ));
            }
            if !seen.insert(field.name.clone()) {
                return Err(SchemaError::invalid_component(
                    self.name.as_str(),
                    format!("duplicate field `{}`", field.name),
                ));
            }
        }

        Ok(Arc::new(ComponentDescriptor {
            name: self.name,
            type_id: TypeId::of::<C>(),
            type_name: type_name::<C>(),
            fields: self.fields,
        }))
    }
}
