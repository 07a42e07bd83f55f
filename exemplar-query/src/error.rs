//! Error types for criteria building and session operations.
//!
//! Every error carries an [`ErrorCode`] for programmatic handling, a
//! message, and optional context (entity, field, suggestions).
//!
//! # Error Codes
//!
//! Error codes follow the pattern `E{category}{number}`:
//! - 1xxx: Criteria errors (metadata, identifiers, field access, filters)
//! - 2xxx: Record errors raised by sessions
//! - 7xxx: Configuration errors
//! - 9xxx: Internal errors
//!
//! ```rust
//! use exemplar_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::metadata_unavailable("app::Invoice");
//! assert_eq!(err.code, ErrorCode::MetadataUnavailable);
//! assert_eq!(err.code.code(), "E1001");
//! assert!(err.to_string().contains("app::Invoice"));
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Criteria errors (1xxx)
    /// No metadata registered for the entity type (E1001).
    MetadataUnavailable = 1001,
    /// Identifier is neither single nor composite (E1002).
    UnsupportedIdentifierKind = 1002,
    /// A composite sub-field could not be read (E1003).
    FieldAccess = 1003,
    /// A predicate cannot be evaluated or lowered (E1004).
    InvalidFilter = 1004,

    // Record errors (2xxx)
    /// Record not found (E2001).
    RecordNotFound = 2001,
    /// A record with the same identifier already exists (E2002).
    DuplicateRecord = 2002,

    // Configuration errors (7xxx)
    /// Invalid search configuration (E7001).
    InvalidConfiguration = 7001,

    // Internal errors (9xxx)
    /// Internal error (E9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "E1001").
    pub fn code(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::MetadataUnavailable => "Entity metadata unavailable",
            Self::UnsupportedIdentifierKind => "Unsupported identifier kind",
            Self::FieldAccess => "Component field access failed",
            Self::InvalidFilter => "Invalid filter",
            Self::RecordNotFound => "Record not found",
            Self::DuplicateRecord => "Duplicate record",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Suggestion for fixing an error.
#[derive(Debug, Clone)]
pub struct Suggestion {
    /// The suggestion text.
    pub text: String,
    /// Optional code example.
    pub code: Option<String>,
}

impl Suggestion {
    /// Create a new suggestion.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
        }
    }

    /// Add a code example.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The entity (model) involved.
    pub model: Option<String>,
    /// The field or property path involved.
    pub field: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<Suggestion>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur while building or executing criteria.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(suggestion));
        self
    }

    /// Add a code suggestion.
    pub fn with_code_suggestion(mut self, text: impl Into<String>, code: impl Into<String>) -> Self {
        self.context
            .suggestions
            .push(Suggestion::new(text).with_code(code));
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the model (entity name).
    pub fn with_model(mut self, entity: impl Into<String>) -> Self {
        self.context.model = Some(entity.into());
        self
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create a metadata unavailable error for an unregistered type.
    pub fn metadata_unavailable(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self::new(
            ErrorCode::MetadataUnavailable,
            format!("No entity metadata registered for `{}`", type_name),
        )
        .with_model(&type_name)
        .with_code_suggestion(
            "Register a mapping for the type before searching",
            "MappingRegistry::builder().register(EntityMapping::<T>::new(\"T\").id(..))?",
        )
    }

    /// Create an unsupported identifier kind error.
    pub fn unsupported_identifier_kind(entity: impl Into<String>, kind: impl Into<String>) -> Self {
        let entity = entity.into();
        let kind = kind.into();
        Self::new(
            ErrorCode::UnsupportedIdentifierKind,
            format!(
                "Unsupported criteria identifier type `{}` on {}",
                kind, entity
            ),
        )
        .with_model(&entity)
        .with_help("Only scalar and composite identifiers can be used in example criteria")
    }

    /// Create a component field access error.
    pub fn field_access(entity: impl Into<String>, path: impl Into<String>) -> Self {
        let entity = entity.into();
        let path = path.into();
        Self::new(
            ErrorCode::FieldAccess,
            format!("Cannot read `{}` on {}", path, entity),
        )
        .with_model(&entity)
        .with_field(&path)
        .with_suggestion("Check that the identifier extractor returns the registered component type")
    }

    /// Create an invalid filter error.
    pub fn invalid_filter(path: impl Into<String>, message: impl Into<String>) -> Self {
        let path = path.into();
        let message = message.into();
        Self::new(
            ErrorCode::InvalidFilter,
            format!("Invalid filter on `{}`: {}", path, message),
        )
        .with_field(&path)
    }

    /// Create a not found error.
    pub fn not_found(entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self::new(
            ErrorCode::RecordNotFound,
            format!("No {} record found matching the identifier", entity),
        )
        .with_model(&entity)
        .with_suggestion(format!("Insert the {} before saving changes to it", entity))
    }

    /// Create a duplicate record error.
    pub fn duplicate_record(entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self::new(
            ErrorCode::DuplicateRecord,
            format!("A {} record with the same identifier already exists", entity),
        )
        .with_model(&entity)
        .with_suggestion("Use save() to update an existing record")
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            ErrorCode::InvalidConfiguration,
            format!("Invalid search configuration: {}", message),
        )
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorCode::Internal, format!("Internal error: {}", message))
    }

    // ============== Error Checks ==============

    /// Check if this is a metadata unavailable error.
    pub fn is_metadata_unavailable(&self) -> bool {
        self.code == ErrorCode::MetadataUnavailable
    }

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::RecordNotFound
    }

    /// Check if the error comes from criteria building.
    pub fn is_criteria_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::MetadataUnavailable
                | ErrorCode::UnsupportedIdentifierKind
                | ErrorCode::FieldAccess
                | ErrorCode::InvalidFilter
        )
    }

    // ============== Display Functions ==============

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref model) = self.context.model {
            output.push_str(&format!("  → Model: {}\n", model));
        }
        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  → Field: {}\n", field));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion.text));
                if let Some(ref code) = suggestion.code {
                    output.push_str(&format!(
                        "     ```\n     {}\n     ```\n",
                        code.replace('\n', "\n     ")
                    ));
                }
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

/// Helper for creating errors with context.
#[macro_export]
macro_rules! query_error {
    ($code:expr, $msg:expr) => {
        $crate::error::QueryError::new($code, $msg)
    };
    ($code:expr, $msg:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let mut err = $crate::error::QueryError::new($code, $msg);
        $(
            err = err.$key($value);
        )+
        err
    }};
}
