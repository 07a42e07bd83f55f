//! # Exemplar
//!
//! Query-by-example criteria for mapped Rust entities.
//!
//! Exemplar provides:
//! - An explicit mapping registry describing how plain structs persist
//! - A criteria builder that turns a populated example entity into
//!   equality predicates, expanding composite keys into dotted paths
//! - A session seam with an in-memory implementation, and a controller
//!   offering search, list, get, insert and save
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use exemplar::prelude::*;
//!
//! #[derive(Clone)]
//! struct Account {
//!     username: Option<String>,
//!     password: Option<String>,
//!     logins: i32,
//! }
//!
//! let registry = MappingRegistry::builder()
//!     .register(
//!         EntityMapping::<Account>::new("Account")
//!             .id("username", ScalarType::String, |a: &Account| a.username.clone().map(Value::from))
//!             .property(Column::scalar("password", ScalarType::String), |a: &Account| {
//!                 a.password.clone().map(Value::from)
//!             })
//!             .property(Column::scalar("logins", ScalarType::Int).not_null(), |a: &Account| {
//!                 Some(Value::from(a.logins))
//!             }),
//!     )
//!     .unwrap()
//!     .build();
//!
//! let example = Account {
//!     username: None,
//!     password: Some("secret".into()),
//!     logins: 0,
//! };
//!
//! let spec = Searcher::new(SearchMode::ByNonNullFields)
//!     .build_filter(Some(&example), &registry)
//!     .unwrap();
//!
//! // `logins` is NOT NULL and zero, so it does not constrain the search.
//! assert_eq!(spec.len(), 1);
//! assert_eq!(spec.get("password"), Some(&Value::from("secret")));
//!
//! let controller = Controller::new(InMemorySession::new(Arc::new(registry)));
//! # let _ = controller;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

/// Mapping model: values, type kinds, components, entity mappings and the registry.
pub mod schema {
    pub use exemplar_schema::*;
}

/// Criteria building, filters, sessions, configuration and logging.
pub mod query {
    pub use exemplar_query::*;
}

pub use exemplar_query::logging;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::query::prelude::*;
    pub use crate::query::{SearchConfig, build_filter};
    pub use crate::schema::{
        Column, ComponentDescriptor, ComponentValue, EntityMapping, MappingRegistry,
        MetadataProvider, ScalarType, ScalarValue, TypeKind, Value, is_zero_value,
    };
}

pub use exemplar_query::{QueryError, QueryResult};
pub use exemplar_schema::{SchemaError, SchemaResult};
