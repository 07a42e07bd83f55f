//! Error types for entity and component mappings.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for mapping operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building mappings or registering them.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// An entity mapping was built without an identifier.
    #[error("entity `{entity}` has no identifier mapping")]
    #[diagnostic(
        code(exemplar::schema::missing_identifier),
        help("call `.id(..)`, `.composite_id(..)` or `.identifier(..)` before `.build()`")
    )]
    MissingIdentifier { entity: String },

    /// Two properties of one entity share a name.
    #[error("duplicate property `{entity}.{property}`")]
    #[diagnostic(code(exemplar::schema::duplicate_property))]
    DuplicateProperty { entity: String, property: String },

    /// The same entity type or entity name was registered twice.
    #[error("entity `{name}` is already registered")]
    #[diagnostic(code(exemplar::schema::duplicate_entity))]
    DuplicateEntity { name: String },

    /// Invalid entity mapping.
    #[error("invalid mapping for `{entity}`: {message}")]
    #[diagnostic(code(exemplar::schema::invalid_mapping))]
    InvalidMapping { entity: String, message: String },

    /// Invalid component descriptor.
    #[error("invalid component `{name}`: {message}")]
    #[diagnostic(code(exemplar::schema::invalid_component))]
    InvalidComponent { name: String, message: String },
}

impl SchemaError {
    /// Create a missing identifier error.
    pub fn missing_identifier(entity: impl Into<String>) -> Self {
        Self::MissingIdentifier {
            entity: entity.into(),
        }
    }

    /// Create a duplicate property error.
    pub fn duplicate_property(entity: impl Into<String>, property: impl Into<String>) -> Self {
        Self::DuplicateProperty {
            entity: entity.into(),
            property: property.into(),
        }
    }

    /// Create a duplicate entity error.
    pub fn duplicate_entity(name: impl Into<String>) -> Self {
        Self::DuplicateEntity { name: name.into() }
    }

    /// Create an invalid mapping error.
    pub fn invalid_mapping(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidMapping {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Create an invalid component error.
    pub fn invalid_component(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SchemaError::duplicate_property("Account", "password");
        assert_eq!(err.to_string(), "duplicate property `Account.password`");

        let err = SchemaError::missing_identifier("User");
        assert!(err.to_string().contains("User"));
    }

    #[test]
    fn test_diagnostic_code() {
        let err = SchemaError::duplicate_entity("Account");
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("exemplar::schema::duplicate_entity"));
    }
}
