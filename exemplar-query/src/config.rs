//! Search configuration parsing.
//!
//! ```toml
//! [search]
//! mode = "by_non_null_fields"
//! exclude = ["password"]
//!
//! [search.entities.Account]
//! exclude = ["id.site"]
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use exemplar_schema::MetadataProvider;

use crate::error::{QueryError, QueryResult};
use crate::search::{SearchMode, Searcher};

/// Top-level search configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Searcher settings.
    #[serde(default)]
    pub search: SearchSection,
}

/// The `[search]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchSection {
    /// Search mode for every searcher.
    #[serde(default)]
    pub mode: SearchMode,

    /// Names excluded for every entity.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Per-entity settings keyed by entity name.
    #[serde(default)]
    pub entities: IndexMap<String, EntitySearchConfig>,
}

/// A `[search.entities.<Name>]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EntitySearchConfig {
    /// Names excluded for this entity only.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl SearchConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            QueryError::invalid_configuration(format!("cannot read {}", path.display())).with_source(e)
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> QueryResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            QueryError::invalid_configuration(e.message().to_string()).with_source(e)
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> QueryResult<()> {
        let entity_excludes = self
            .search
            .entities
            .values()
            .flat_map(|entity| entity.exclude.iter());
        if self.search.exclude.iter().chain(entity_excludes).any(String::is_empty) {
            return Err(QueryError::invalid_configuration(
                "excluded property names must not be empty",
            ));
        }
        Ok(())
    }

    /// Check that every configured entity name is registered.
    pub fn check_entities<P: MetadataProvider + ?Sized>(&self, provider: &P) -> QueryResult<()> {
        for name in self.search.entities.keys() {
            if provider.class_metadata_by_name(name).is_none() {
                return Err(QueryError::invalid_configuration(format!(
                    "unknown entity `{}` in [search.entities]",
                    name
                ))
                .with_model(name));
            }
        }
        Ok(())
    }

    /// Create a searcher with the global settings only.
    pub fn searcher(&self) -> Searcher {
        Searcher::new(self.search.mode).exclude_all(self.search.exclude.iter().map(String::as_str))
    }

    /// Create a searcher for one entity: global plus per-entity exclusions.
    pub fn searcher_for(&self, entity_name: &str) -> Searcher {
        let searcher = self.searcher();
        match self.search.entities.get(entity_name) {
            Some(entity) => searcher.exclude_all(entity.exclude.iter().map(String::as_str)),
            None => searcher,
        }
    }
}
