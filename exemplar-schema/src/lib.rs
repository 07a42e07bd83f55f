//! # exemplar-schema
//!
//! Entity mapping metadata for the Exemplar query-by-example toolkit.
//!
//! This crate describes how plain Rust structs are persisted:
//! - [`Value`] and [`ScalarValue`]: the closed value model read from entities
//! - [`TypeKind`]: scalar, association, composite, collection or polymorphic
//! - [`ComponentDescriptor`]: explicit sub-field accessors for structured values
//!   such as composite primary keys
//! - [`EntityMapping`] / [`ClassMetadata`]: the registered description of one
//!   entity type
//! - [`MappingRegistry`]: the explicitly owned [`MetadataProvider`]
//!
//! ## Registering entities
//!
//! ```rust
//! use exemplar_schema::{Column, EntityMapping, MappingRegistry, ScalarType, Value};
//!
//! struct Account {
//!     username: Option<String>,
//!     password: Option<String>,
//! }
//!
//! let registry = MappingRegistry::builder()
//!     .register(
//!         EntityMapping::<Account>::new("Account")
//!             .id("username", ScalarType::String, |a: &Account| {
//!                 a.username.clone().map(Value::from)
//!             })
//!             .property(Column::scalar("password", ScalarType::String), |a: &Account| {
//!                 a.password.clone().map(Value::from)
//!             }),
//!     )
//!     .unwrap()
//!     .build();
//!
//! assert!(registry.contains::<Account>());
//! ```

pub mod component;
pub mod error;
pub mod mapping;
pub mod registry;
pub mod types;
pub mod value;

pub use component::{ComponentDescriptor, ComponentDescriptorBuilder, ComponentField};
pub use error::{SchemaError, SchemaResult};
pub use mapping::{ClassMetadata, Column, EntityMapping};
pub use registry::{MappingRegistry, MappingRegistryBuilder, MetadataProvider};
pub use types::{ScalarType, TypeKind};
pub use value::{ComponentValue, ScalarValue, Value, is_zero_value};
