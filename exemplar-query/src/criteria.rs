//! Filter specifications: the criteria handed to a session.
//!
//! A [`FilterSpecification`] is an ordered conjunction of equality
//! predicates plus the entity type it targets. No predicates means
//! "select all".
//!
//! ```rust
//! use exemplar_query::{Filter, FilterSpecification};
//!
//! struct Account;
//!
//! let spec = FilterSpecification::new::<Account>()
//!     .equals("username", "woody")
//!     .equals("logins", 3);
//!
//! assert_eq!(spec.len(), 2);
//! let (sql, params) = spec.to_filter().unwrap().to_sql(0);
//! assert_eq!(sql, "(username = $1 AND logins = $2)");
//! assert_eq!(params.len(), 2);
//!
//! assert_eq!(FilterSpecification::select_all::<Account>().to_filter().unwrap(), Filter::None);
//! ```

use std::any::{Any, TypeId, type_name};
use std::fmt;

use smol_str::SmolStr;

use exemplar_schema::Value;

use crate::error::{QueryError, QueryResult};
use crate::filter::{Filter, FilterValue};
use crate::metadata::EntityMetadata;

/// Reference to the Rust type a specification targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
    type_id: TypeId,
    type_name: &'static str,
}

impl EntityRef {
    /// Reference entity type `E`.
    pub fn of<E: Any>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            type_name: type_name::<E>(),
        }
    }

    /// Check whether this references `E`.
    pub fn is<E: Any>(&self) -> bool {
        self.type_id == TypeId::of::<E>()
    }

    /// Get the `TypeId` of the target.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Get the Rust type name of the target.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// A single equality predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    path: SmolStr,
    value: Value,
}

impl Predicate {
    /// Create a predicate.
    pub fn new(path: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Get the property path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the required value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Lower to a filter expression.
    ///
    /// A component value becomes a conjunction over its dotted sub-field
    /// paths; an absent sub-field must be null.
    pub fn to_filter(&self) -> QueryResult<Filter> {
        lower(&self.path, &self.value)
    }

    /// Check the predicate against a described instance.
    pub fn matches(&self, metadata: &EntityMetadata) -> QueryResult<bool> {
        Ok(metadata.value_at(&self.path)?.as_ref() == Some(&self.value))
    }
}

fn lower(path: &str, value: &Value) -> QueryResult<Filter> {
    let Some(component) = value.as_component() else {
        return Ok(Filter::Equals(path.to_string(), FilterValue::from_value(path, value)?));
    };

    let fields = component
        .fields()
        .ok_or_else(|| QueryError::field_access(component.descriptor().name(), path))?;

    let mut parts = Vec::with_capacity(fields.len());
    for (name, sub_value) in &fields {
        let sub_path = format!("{}.{}", path, name);
        parts.push(match sub_value {
            Some(sub_value) => lower(&sub_path, sub_value)?,
            None => Filter::Equals(sub_path, FilterValue::Null),
        });
    }
    Ok(Filter::and(parts))
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {:?}", self.path, self.value)
    }
}

/// Ordered equality predicates over one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpecification {
    target: EntityRef,
    predicates: Vec<Predicate>,
}

impl FilterSpecification {
    /// A specification matching every `E`.
    pub fn select_all<E: Any>() -> Self {
        Self::for_target(EntityRef::of::<E>())
    }

    /// Start an empty specification over `E`.
    pub fn new<E: Any>() -> Self {
        Self::select_all::<E>()
    }

    /// Start an empty specification over a referenced type.
    pub fn for_target(target: EntityRef) -> Self {
        Self {
            target,
            predicates: Vec::new(),
        }
    }

    /// Add an equality predicate.
    pub fn equals(mut self, path: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        self.push(Predicate::new(path, value));
        self
    }

    pub(crate) fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    /// Get the targeted entity type.
    pub fn target(&self) -> EntityRef {
        self.target
    }

    /// Get the predicates in insertion order.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Get the number of predicates.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Check if there are no predicates.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Check if the specification selects every record.
    pub fn is_select_all(&self) -> bool {
        self.is_empty()
    }

    /// Get the value required for a path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.predicates
            .iter()
            .find(|p| p.path() == path)
            .map(Predicate::value)
    }

    /// Check whether a path is constrained.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Compare predicates regardless of order.
    pub fn same_predicates(&self, other: &Self) -> bool {
        self.target == other.target
            && self.len() == other.len()
            && self.predicates.iter().all(|p| other.predicates.contains(p))
    }

    /// Check every predicate against a described instance.
    pub fn matches(&self, metadata: &EntityMetadata) -> QueryResult<bool> {
        for predicate in &self.predicates {
            if !predicate.matches(metadata)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Lower to a filter expression.
    pub fn to_filter(&self) -> QueryResult<Filter> {
        let parts = self
            .predicates
            .iter()
            .map(Predicate::to_filter)
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(Filter::and(parts))
    }
}
