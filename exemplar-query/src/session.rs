//! In-memory session.
//!
//! [`InMemorySession`] evaluates filter specifications against entities kept
//! in process. It backs the test suite and demonstrates what a real session
//! has to do with a [`FilterSpecification`].

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use exemplar_schema::{ClassMetadata, MappingRegistry, MetadataProvider, Value};

use crate::criteria::FilterSpecification;
use crate::error::{QueryError, QueryResult};
use crate::metadata::EntityMetadata;
use crate::traits::{BoxFuture, Entity, Session};

type Record = Arc<dyn Any + Send + Sync>;

/// Session over an in-process entity store.
///
/// Clones share the registry and the store.
#[derive(Clone)]
pub struct InMemorySession {
    registry: Arc<MappingRegistry>,
    store: Arc<RwLock<HashMap<TypeId, Vec<Record>>>>,
}

impl InMemorySession {
    /// Create an empty session over a registry.
    pub fn new(registry: Arc<MappingRegistry>) -> Self {
        Self {
            registry,
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the registry.
    pub fn registry(&self) -> &Arc<MappingRegistry> {
        &self.registry
    }

    /// Get the number of stored `E`.
    pub fn count<E: Entity>(&self) -> usize {
        self.store
            .read()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Remove every stored entity.
    pub fn clear(&self) {
        self.store.write().clear();
    }

    fn class<E: Entity>(&self) -> QueryResult<Arc<ClassMetadata>> {
        self.registry
            .class_metadata(TypeId::of::<E>())
            .ok_or_else(|| QueryError::metadata_unavailable(type_name::<E>()))
    }

    fn select<E: Entity>(&self, spec: &FilterSpecification) -> QueryResult<Vec<E>> {
        let class = self.class::<E>()?;
        if !spec.target().is::<E>() {
            return Err(QueryError::invalid_filter(
                spec.target().type_name(),
                format!("specification does not target {}", class.entity_name()),
            ));
        }

        let store = self.store.read();
        let mut found = Vec::new();
        for record in store.get(&TypeId::of::<E>()).into_iter().flatten() {
            let metadata = EntityMetadata::from_class(&**record, Arc::clone(&class))?;
            if spec.matches(&metadata)? {
                found.extend(record.downcast_ref::<E>().cloned());
            }
        }

        debug!(
            entity = class.entity_name(),
            predicates = spec.len(),
            matched = found.len(),
            "Executed in-memory find_many"
        );
        Ok(found)
    }

    fn lookup<E: Entity>(&self, id: &Value) -> QueryResult<Option<E>> {
        let class = self.class::<E>()?;
        let store = self.store.read();
        let found = store
            .get(&TypeId::of::<E>())
            .into_iter()
            .flatten()
            .find(|record| has_identifier(&class, &***record, id))
            .and_then(|record| record.downcast_ref::<E>().cloned());
        Ok(found)
    }

    fn store_new<E: Entity>(&self, entity: E) -> QueryResult<E> {
        let class = self.class::<E>()?;
        let id = class.identifier_value(&entity).flatten();

        let mut store = self.store.write();
        let records = store.entry(TypeId::of::<E>()).or_default();
        if let Some(ref id) = id {
            if records.iter().any(|r| has_identifier(&class, &**r, id)) {
                return Err(QueryError::duplicate_record(class.entity_name()));
            }
        }

        records.push(Arc::new(entity.clone()));
        debug!(entity = class.entity_name(), "Inserted record");
        Ok(entity)
    }

    fn replace<E: Entity>(&self, entity: E) -> QueryResult<E> {
        let class = self.class::<E>()?;
        let Some(id) = class.identifier_value(&entity).flatten() else {
            return Err(QueryError::not_found(class.entity_name())
                .with_help("The entity has no identifier value"));
        };

        let mut store = self.store.write();
        let slot = store
            .get_mut(&TypeId::of::<E>())
            .and_then(|records| records.iter_mut().find(|r| has_identifier(&class, &***r, &id)))
            .ok_or_else(|| QueryError::not_found(class.entity_name()))?;

        let record: Record = Arc::new(entity.clone());
        *slot = record;
        debug!(entity = class.entity_name(), "Updated record");
        Ok(entity)
    }
}

fn has_identifier(class: &ClassMetadata, record: &dyn Any, id: &Value) -> bool {
    class.identifier_value(record).flatten().as_ref() == Some(id)
}

impl fmt::Debug for InMemorySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.store.read();
        f.debug_struct("InMemorySession")
            .field("entities", &self.registry.entity_names().collect::<Vec<_>>())
            .field("records", &store.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

impl Session for InMemorySession {
    fn metadata(&self) -> &dyn MetadataProvider {
        &*self.registry
    }

    fn find_many<E: Entity>(&self, spec: FilterSpecification) -> BoxFuture<'_, QueryResult<Vec<E>>> {
        let result = self.select(&spec);
        Box::pin(futures::future::ready(result))
    }

    fn find_by_id<E: Entity>(&self, id: Value) -> BoxFuture<'_, QueryResult<Option<E>>> {
        let result = self.lookup(&id);
        Box::pin(futures::future::ready(result))
    }

    fn insert<E: Entity>(&self, entity: E) -> BoxFuture<'_, QueryResult<E>> {
        let result = self.store_new(entity);
        Box::pin(futures::future::ready(result))
    }

    fn update<E: Entity>(&self, entity: E) -> BoxFuture<'_, QueryResult<E>> {
        let result = self.replace(entity);
        Box::pin(futures::future::ready(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use exemplar_schema::{Column, EntityMapping, ScalarType};

    #[derive(Debug, Clone, PartialEq)]
    struct Book {
        isbn: Option<String>,
        title: Option<String>,
        pages: i32,
    }

    #[derive(Debug, Clone)]
    struct Unmapped;

    fn book(isbn: &str, title: &str, pages: i32) -> Book {
        Book {
            isbn: Some(isbn.into()),
            title: Some(title.into()),
            pages,
        }
    }

    fn session() -> InMemorySession {
        let registry = MappingRegistry::builder()
            .register(
                EntityMapping::<Book>::new("Book")
                    .id("isbn", ScalarType::String, |b: &Book| b.isbn.clone().map(Value::from))
                    .property(Column::scalar("title", ScalarType::String), |b: &Book| {
                        b.title.clone().map(Value::from)
                    })
                    .property(Column::scalar("pages", ScalarType::Int).not_null(), |b: &Book| {
                        Some(Value::from(b.pages))
                    }),
            )
            .unwrap()
            .build();
        InMemorySession::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_insert_and_find_many() {
        let session = session();
        session.insert(book("1", "Dune", 412)).await.unwrap();
        session.insert(book("2", "Emma", 474)).await.unwrap();
        assert_eq!(session.count::<Book>(), 2);

        let all: Vec<Book> = session
            .find_many(FilterSpecification::select_all::<Book>())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let spec = FilterSpecification::new::<Book>().equals("title", "Emma");
        let found: Vec<Book> = session.find_many(spec).await.unwrap();
        assert_eq!(found, vec![book("2", "Emma", 474)]);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let session = session();
        session.insert(book("1", "Dune", 412)).await.unwrap();

        let found: Option<Book> = session.find_by_id(Value::from("1")).await.unwrap();
        assert_eq!(found.map(|b| b.pages), Some(412));
        let missing: Option<Book> = session.find_by_id(Value::from("9")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert() {
        let session = session();
        session.insert(book("1", "Dune", 412)).await.unwrap();
        let err = session.insert(book("1", "Other", 1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateRecord);
    }

    #[tokio::test]
    async fn test_update() {
        let session = session();
        session.insert(book("1", "Dune", 412)).await.unwrap();
        session.update(book("1", "Dune Messiah", 256)).await.unwrap();

        let found: Option<Book> = session.find_by_id(Value::from("1")).await.unwrap();
        assert_eq!(found.and_then(|b| b.title).as_deref(), Some("Dune Messiah"));

        let err = session.update(book("7", "Nope", 1)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unregistered_type() {
        let session = session();
        let err = session.insert(Unmapped).await.unwrap_err();
        assert!(err.is_metadata_unavailable());
    }

    #[tokio::test]
    async fn test_spec_for_other_type_is_rejected() {
        let session = session();
        let spec = FilterSpecification::select_all::<Unmapped>();
        let err = session.find_many::<Book>(spec).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFilter);
    }

    #[tokio::test]
    async fn test_clones_share_the_store() {
        let session = session();
        let other = session.clone();
        other.insert(book("1", "Dune", 412)).await.unwrap();
        assert_eq!(session.count::<Book>(), 1);

        session.clear();
        assert_eq!(other.count::<Book>(), 0);
        assert!(format!("{:?}", other).contains("Book"));
    }
}
