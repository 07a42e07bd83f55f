//! Core traits for executing criteria.

use std::any::Any;

use exemplar_schema::{MetadataProvider, Value};

use crate::criteria::FilterSpecification;
use crate::error::QueryResult;

pub use futures::future::BoxFuture;

/// A persistent entity type.
///
/// Blanket-implemented for every owned, cloneable, thread-safe type. A type
/// still needs a registered mapping before a session accepts it.
pub trait Entity: Any + Clone + Send + Sync {}

impl<T: Any + Clone + Send + Sync> Entity for T {}

/// A handle to the persistence layer.
///
/// Sessions execute filter specifications built by a
/// [`Searcher`](crate::search::Searcher) and expose the metadata provider
/// those specifications are built against.
pub trait Session: Clone + Send + Sync {
    /// Get the metadata provider of this session.
    fn metadata(&self) -> &dyn MetadataProvider;

    /// Find every stored `E` matching all predicates.
    fn find_many<E: Entity>(&self, spec: FilterSpecification) -> BoxFuture<'_, QueryResult<Vec<E>>>;

    /// Find the `E` with the given identifier value.
    fn find_by_id<E: Entity>(&self, id: Value) -> BoxFuture<'_, QueryResult<Option<E>>>;

    /// Store a new entity.
    fn insert<E: Entity>(&self, entity: E) -> BoxFuture<'_, QueryResult<E>>;

    /// Replace the stored entity with the same identifier.
    fn update<E: Entity>(&self, entity: E) -> BoxFuture<'_, QueryResult<E>>;
}
