//! Controller: the caller-facing entry point over a session.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use exemplar_query::{Controller, InMemorySession, SearchMode};
//! use exemplar_schema::{Column, EntityMapping, MappingRegistry, ScalarType, Value};
//!
//! #[derive(Clone)]
//! struct Account {
//!     username: Option<String>,
//!     password: Option<String>,
//! }
//!
//! # futures::executor::block_on(async {
//! let registry = MappingRegistry::builder()
//!     .register(
//!         EntityMapping::<Account>::new("Account")
//!             .id("username", ScalarType::String, |a: &Account| a.username.clone().map(Value::from))
//!             .property(Column::scalar("password", ScalarType::String), |a: &Account| {
//!                 a.password.clone().map(Value::from)
//!             }),
//!     )
//!     .unwrap()
//!     .build();
//!
//! let controller = Controller::new(InMemorySession::new(Arc::new(registry)));
//! controller
//!     .insert(Account { username: Some("woody".into()), password: Some("pw".into()) })
//!     .await
//!     .unwrap();
//!
//! let example = Account { username: None, password: Some("pw".into()) };
//! let found = controller
//!     .search(&controller.searcher(SearchMode::ByNonNullFields), Some(&example))
//!     .await
//!     .unwrap();
//! assert_eq!(found.len(), 1);
//! # });
//! ```

use tracing::debug;

use exemplar_schema::Value;

use crate::criteria::FilterSpecification;
use crate::error::QueryResult;
use crate::search::{SearchMode, Searcher};
use crate::traits::{Entity, Session};

/// Entry point pairing a session with example-based searching.
#[derive(Debug, Clone)]
pub struct Controller<S> {
    session: S,
}

impl<S: Session> Controller<S> {
    /// Create a controller over a session handle.
    pub fn new(session: S) -> Self {
        Self { session }
    }

    /// Get the session.
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Create a searcher with no exclusions.
    pub fn searcher(&self, mode: SearchMode) -> Searcher {
        Searcher::new(mode)
    }

    /// Find every `E` matching the example. `None` lists everything.
    pub async fn search<E: Entity>(&self, searcher: &Searcher, example: Option<&E>) -> QueryResult<Vec<E>> {
        let spec = searcher.build_filter(example, self.session.metadata())?;
        debug!(predicates = spec.len(), "Searching by example");
        self.session.find_many(spec).await
    }

    /// List every stored `E`.
    pub async fn list<E: Entity>(&self) -> QueryResult<Vec<E>> {
        self.session
            .find_many(FilterSpecification::select_all::<E>())
            .await
    }

    /// Get the `E` with the given identifier value.
    pub async fn get<E: Entity>(&self, id: impl Into<Value>) -> QueryResult<Option<E>> {
        self.session.find_by_id(id.into()).await
    }

    /// Store a new entity.
    pub async fn insert<E: Entity>(&self, entity: E) -> QueryResult<E> {
        self.session.insert(entity).await
    }

    /// Save changes to a stored entity.
    pub async fn save<E: Entity>(&self, entity: E) -> QueryResult<E> {
        self.session.update(entity).await
    }
}
