//! # exemplar-query
//!
//! Query-by-example criteria for the Exemplar toolkit.
//!
//! This crate turns populated example entities into equality criteria:
//! - [`EntityMetadata`]: identifier and properties of one instance
//! - [`Searcher`]: the criteria builder, with per-searcher exclusions
//! - [`FilterSpecification`]: the ordered equality predicates it produces
//! - [`Filter`] / [`FilterValue`]: the lowered expression tree with SQL rendering
//! - [`Session`] / [`InMemorySession`]: the execution seam
//! - [`Controller`]: search, list, get, insert and save over a session
//! - [`SearchConfig`]: TOML search settings
//!
//! ## Filters
//!
//! ```rust
//! use exemplar_query::{Filter, FilterValue};
//!
//! let filter = Filter::and([
//!     Filter::equals("name", "woody"),
//!     Filter::Equals("deleted_at".into(), FilterValue::Null),
//! ]);
//!
//! let (sql, params) = filter.to_sql(0);
//! assert_eq!(sql, "(name = $1 AND deleted_at IS NULL)");
//! assert_eq!(params, vec![FilterValue::String("woody".into())]);
//! ```
//!
//! ## Composite keys
//!
//! A composite identifier expands into one predicate per sub-field:
//!
//! ```rust
//! use exemplar_query::Searcher;
//! use exemplar_schema::{ComponentDescriptor, EntityMapping, MappingRegistry, Value};
//!
//! #[derive(Clone)]
//! struct UserId {
//!     site: String,
//!     name: Option<String>,
//! }
//!
//! struct User {
//!     id: Option<UserId>,
//! }
//!
//! let user_id = ComponentDescriptor::builder::<UserId>("UserId")
//!     .field("site", |k: &UserId| Some(Value::from(k.site.as_str())))
//!     .field("name", |k: &UserId| k.name.clone().map(Value::from))
//!     .build()
//!     .unwrap();
//!
//! let registry = MappingRegistry::builder()
//!     .register(EntityMapping::<User>::new("User").composite_id("id", user_id, |u: &User| u.id.clone()))
//!     .unwrap()
//!     .build();
//!
//! let example = User {
//!     id: Some(UserId { site: "hk".into(), name: None }),
//! };
//! let spec = Searcher::default().build_filter(Some(&example), &registry).unwrap();
//!
//! assert_eq!(spec.len(), 1);
//! assert_eq!(spec.get("id.site"), Some(&Value::from("hk")));
//! ```

pub mod config;
pub mod controller;
pub mod criteria;
pub mod error;
pub mod filter;
pub mod logging;
pub mod metadata;
pub mod search;
pub mod session;
pub mod traits;

pub use config::{EntitySearchConfig, SearchConfig, SearchSection};
pub use controller::Controller;
pub use criteria::{EntityRef, FilterSpecification, Predicate};
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult, Suggestion};
pub use filter::{Filter, FilterValue};
pub use metadata::{EntityMetadata, Identifier, Property};
pub use search::{SearchMode, Searcher, build_filter};
pub use session::InMemorySession;
pub use traits::{BoxFuture, Entity, Session};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::controller::Controller;
    pub use crate::criteria::{FilterSpecification, Predicate};
    pub use crate::error::{ErrorCode, QueryError, QueryResult};
    pub use crate::filter::{Filter, FilterValue};
    pub use crate::metadata::EntityMetadata;
    pub use crate::search::{SearchMode, Searcher};
    pub use crate::session::InMemorySession;
    pub use crate::traits::{Entity, Session};
    pub use crate::query_error;
}
