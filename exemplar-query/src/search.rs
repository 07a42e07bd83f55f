//! Query-by-example criteria building.
//!
//! A [`Searcher`] inspects a populated example entity and turns its
//! non-absent, non-default fields into equality predicates:
//!
//! ```rust
//! use exemplar_query::{SearchMode, Searcher};
//! use exemplar_schema::{Column, EntityMapping, MappingRegistry, ScalarType, Value};
//!
//! struct Account {
//!     username: Option<String>,
//!     password: Option<String>,
//!     active: bool,
//! }
//!
//! let registry = MappingRegistry::builder()
//!     .register(
//!         EntityMapping::<Account>::new("Account")
//!             .id("username", ScalarType::String, |a: &Account| a.username.clone().map(Value::from))
//!             .property(Column::scalar("password", ScalarType::String), |a: &Account| {
//!                 a.password.clone().map(Value::from)
//!             })
//!             .property(Column::scalar("active", ScalarType::Boolean).not_null(), |a: &Account| {
//!                 Some(Value::from(a.active))
//!             }),
//!     )
//!     .unwrap()
//!     .build();
//!
//! let example = Account {
//!     username: Some("woody".into()),
//!     password: Some("secret".into()),
//!     active: true,
//! };
//!
//! let spec = Searcher::new(SearchMode::ByNonNullFields)
//!     .exclude("password")
//!     .build_filter(Some(&example), &registry)
//!     .unwrap();
//!
//! assert_eq!(spec.len(), 1);
//! assert_eq!(spec.get("username"), Some(&Value::from("woody")));
//! ```
//!
//! # Inclusion rules
//!
//! For every mapped property, in mapping order:
//! - on a NOT NULL column a zero scalar (`0`, `0.0`, `'\0'`) counts as absent
//! - booleans are never included
//! - associations, collections, polymorphic references and excluded names
//!   are skipped
//!
//! A single identifier adds one predicate. A composite identifier adds one
//! `<id>.<sub-field>` predicate per present sub-field, with the zero and
//! boolean rules applied as for a NOT NULL column.

use std::any::Any;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::{debug, trace};

use exemplar_schema::{MetadataProvider, Value, is_zero_value};

use crate::criteria::{FilterSpecification, Predicate};
use crate::error::{QueryError, QueryResult};
use crate::metadata::EntityMetadata;

/// How an example entity is turned into predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Match on every field that is present and not a default.
    #[default]
    ByNonNullFields,
}

/// Builds filter specifications from example entities.
///
/// A searcher owns its exclusion set. Configure it before use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Searcher {
    mode: SearchMode,
    exclusion: IndexSet<SmolStr>,
}

impl Searcher {
    /// Create a searcher with no exclusions.
    pub fn new(mode: SearchMode) -> Self {
        Self {
            mode,
            exclusion: IndexSet::new(),
        }
    }

    /// Get the search mode.
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Never include a property name or composite path.
    pub fn exclude(mut self, name: impl Into<SmolStr>) -> Self {
        self.exclusion.insert(name.into());
        self
    }

    /// Exclude several names at once.
    pub fn exclude_all<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.exclusion.extend(names.into_iter().map(Into::into));
        self
    }

    /// Check whether a name was excluded.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclusion.contains(name)
    }

    /// Get the excluded names in insertion order.
    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.exclusion.iter().map(SmolStr::as_str)
    }

    /// Build a specification from an example. `None` selects everything.
    pub fn build_filter<E, P>(&self, example: Option<&E>, provider: &P) -> QueryResult<FilterSpecification>
    where
        E: Any,
        P: MetadataProvider + ?Sized,
    {
        build_filter(self.mode, example, provider, &self.exclusion)
    }
}

/// Build a specification from an example entity.
///
/// An absent example yields a select-all specification without consulting
/// the provider.
pub fn build_filter<E, P>(
    mode: SearchMode,
    example: Option<&E>,
    provider: &P,
    excluded: &IndexSet<SmolStr>,
) -> QueryResult<FilterSpecification>
where
    E: Any,
    P: MetadataProvider + ?Sized,
{
    let mut spec = FilterSpecification::new::<E>();
    let Some(example) = example else {
        trace!(target_type = spec.target().type_name(), "No example, selecting all");
        return Ok(spec);
    };

    let entity = EntityMetadata::describe(example, provider)?;

    match mode {
        SearchMode::ByNonNullFields => {
            for property in entity.properties() {
                let Some(value) = normalize(property.value(), property.is_nullable()) else {
                    continue;
                };
                if property.kind().is_foreign_key_driven() || excluded.contains(property.name()) {
                    trace!(property = property.name(), "Skipping property");
                    continue;
                }
                spec.push(Predicate::new(property.name(), value.clone()));
            }
        }
    }

    match mode {
        SearchMode::ByNonNullFields => add_identifier(&mut spec, &entity, excluded)?,
    }

    debug!(
        entity = entity.entity_name(),
        predicates = spec.len(),
        "Built example criteria"
    );
    Ok(spec)
}

fn add_identifier(
    spec: &mut FilterSpecification,
    entity: &EntityMetadata,
    excluded: &IndexSet<SmolStr>,
) -> QueryResult<()> {
    let identifier = entity.identifier();
    let Some(id_value) = identifier.value() else {
        return Ok(());
    };

    if entity.has_single_identifier() {
        if !excluded.contains(identifier.property_name()) {
            spec.push(Predicate::new(identifier.property_name(), id_value.clone()));
        }
    } else if entity.has_composite_identifier() {
        for (path, value) in entity.composite_identifier_values()? {
            let Some(value) = normalize(value.as_ref(), false) else {
                continue;
            };
            if !excluded.contains(path.as_str()) {
                spec.push(Predicate::new(path, value.clone()));
            }
        }
    } else {
        return Err(QueryError::unsupported_identifier_kind(
            entity.entity_name(),
            identifier.kind().category(),
        ));
    }
    Ok(())
}

/// Treat booleans, and zero scalars on NOT NULL columns, as absent.
fn normalize(value: Option<&Value>, nullable: bool) -> Option<&Value> {
    if !nullable && is_zero_value(value) {
        return None;
    }
    value.filter(|v| !v.is_bool())
}

#[cfg(test)]
mod tests {
    use super::*;
    use exemplar_schema::{Column, EntityMapping, MappingRegistry, ScalarType};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Account {
        username: Option<String>,
        password: Option<String>,
        logins: i32,
        score: Option<i32>,
        verified: Option<bool>,
        owner: Option<i64>,
    }

    struct Unmapped;

    fn registry() -> MappingRegistry {
        MappingRegistry::builder()
            .register(
                EntityMapping::<Account>::new("Account")
                    .id("username", ScalarType::String, |a: &Account| {
                        a.username.clone().map(Value::from)
                    })
                    .property(Column::scalar("password", ScalarType::String), |a: &Account| {
                        a.password.clone().map(Value::from)
                    })
                    .property(Column::scalar("logins", ScalarType::Int).not_null(), |a: &Account| {
                        Some(Value::from(a.logins))
                    })
                    .property(Column::scalar("score", ScalarType::Int), |a: &Account| {
                        a.score.map(Value::from)
                    })
                    .property(Column::scalar("verified", ScalarType::Boolean), |a: &Account| {
                        a.verified.map(Value::from)
                    })
                    .property(Column::association("owner", "User"), |a: &Account| {
                        a.owner.map(Value::reference)
                    }),
            )
            .unwrap()
            .build()
    }

    fn paths(spec: &FilterSpecification) -> Vec<&str> {
        spec.predicates().iter().map(Predicate::path).collect()
    }

    #[test]
    fn test_absent_example_selects_all() {
        let empty = MappingRegistry::default();
        let spec = Searcher::default()
            .build_filter(None::<&Unmapped>, &empty)
            .unwrap();
        assert!(spec.is_select_all());
        assert!(spec.target().is::<Unmapped>());
    }

    #[test]
    fn test_unregistered_example_fails() {
        let err = Searcher::default()
            .build_filter(Some(&Unmapped), &registry())
            .unwrap_err();
        assert!(err.is_metadata_unavailable());
    }

    #[test]
    fn test_properties_then_identifier() {
        let example = Account {
            username: Some("woody".into()),
            password: Some("pw".into()),
            logins: 3,
            ..Default::default()
        };
        let spec = Searcher::default().build_filter(Some(&example), &registry()).unwrap();

        assert_eq!(paths(&spec), vec!["password", "logins", "username"]);
        assert_eq!(spec.get("logins"), Some(&Value::from(3)));
    }

    #[test]
    fn test_zero_on_not_null_column_is_absent() {
        let spec = Searcher::default()
            .build_filter(Some(&Account::default()), &registry())
            .unwrap();
        assert!(spec.is_empty());
    }

    #[test]
    fn test_zero_on_nullable_column_is_kept() {
        let example = Account {
            score: Some(0),
            ..Default::default()
        };
        let spec = Searcher::default().build_filter(Some(&example), &registry()).unwrap();
        assert_eq!(spec.get("score"), Some(&Value::from(0)));
    }

    #[test]
    fn test_booleans_and_associations_are_skipped() {
        let example = Account {
            verified: Some(true),
            owner: Some(9),
            ..Default::default()
        };
        let spec = Searcher::default().build_filter(Some(&example), &registry()).unwrap();
        assert!(spec.is_empty());
    }

    #[test]
    fn test_exclusions() {
        let example = Account {
            username: Some("woody".into()),
            password: Some("pw".into()),
            score: Some(5),
            ..Default::default()
        };
        let searcher = Searcher::new(SearchMode::ByNonNullFields)
            .exclude("password")
            .exclude_all(["username", "unknown"]);

        assert!(searcher.is_excluded("password"));
        assert!(!searcher.is_excluded("score"));
        assert_eq!(searcher.excluded().collect::<Vec<_>>(), vec!["password", "username", "unknown"]);

        let spec = searcher.build_filter(Some(&example), &registry()).unwrap();
        assert_eq!(paths(&spec), vec!["score"]);
    }

    #[test]
    fn test_normalize() {
        let zero = Value::from(0i64);
        let flag = Value::from(true);
        let text = Value::from("");

        assert_eq!(normalize(Some(&zero), false), None);
        assert_eq!(normalize(Some(&zero), true), Some(&zero));
        assert_eq!(normalize(Some(&flag), true), None);
        assert_eq!(normalize(Some(&text), false), Some(&text));
        assert_eq!(normalize(None, true), None);
    }

    #[test]
    fn test_search_mode_serde() {
        let mode: SearchMode = serde_json::from_str(r#""by_non_null_fields""#).unwrap();
        assert_eq!(mode, SearchMode::ByNonNullFields);
        assert_eq!(SearchMode::default(), SearchMode::ByNonNullFields);
    }
}
