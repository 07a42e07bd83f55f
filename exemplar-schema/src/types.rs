//! Type classification for mapped properties and identifiers.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::component::ComponentDescriptor;

/// Scalar column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// Single character.
    Char,
    /// 8-bit integer.
    Byte,
    /// 16-bit integer.
    Short,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Boolean flag.
    Boolean,
    /// Character data (VARCHAR/TEXT).
    String,
    /// JSON document.
    Json,
}

impl ScalarType {
    /// Parse a scalar type from its name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Char" => Some(Self::Char),
            "Byte" => Some(Self::Byte),
            "Short" => Some(Self::Short),
            "Int" | "Integer" => Some(Self::Int),
            "Long" => Some(Self::Long),
            "Float" => Some(Self::Float),
            "Double" => Some(Self::Double),
            "Boolean" | "Bool" => Some(Self::Boolean),
            "String" => Some(Self::String),
            "Json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Get the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Char => "Char",
            Self::Byte => "Byte",
            Self::Short => "Short",
            Self::Int => "Int",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Boolean => "Boolean",
            Self::String => "String",
            Self::Json => "Json",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a property or identifier type.
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// A plain column.
    Scalar(ScalarType),
    /// A foreign-key driven reference to another entity.
    Association(SmolStr),
    /// A structured value whose sub-fields map to columns.
    Composite(Arc<ComponentDescriptor>),
    /// A collection of values or entities.
    Collection(SmolStr),
    /// A polymorphic reference (entity name resolved per row).
    Any,
}

impl TypeKind {
    /// Check if this is a scalar type.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Check if this is an association to another entity.
    pub fn is_association(&self) -> bool {
        matches!(self, Self::Association(_))
    }

    /// Check if this is a composite (component) type.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    /// Check if this is a collection type.
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    /// Check if this is a polymorphic reference.
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Check if values of this kind are resolved through foreign keys or
    /// join tables: associations, collections and polymorphic references.
    pub fn is_foreign_key_driven(&self) -> bool {
        matches!(self, Self::Association(_) | Self::Collection(_) | Self::Any)
    }

    /// Get the component descriptor of a composite type.
    pub fn component(&self) -> Option<&Arc<ComponentDescriptor>> {
        match self {
            Self::Composite(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    /// Get the type name as a string.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Scalar(s) => s.as_str(),
            Self::Association(name) | Self::Collection(name) => name.as_str(),
            Self::Composite(descriptor) => descriptor.name(),
            Self::Any => "Any",
        }
    }

    /// Short classification label, used in diagnostics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Association(_) => "association",
            Self::Composite(_) => "composite",
            Self::Collection(_) => "collection",
            Self::Any => "any",
        }
    }
}

impl PartialEq for TypeKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::Association(a), Self::Association(b)) => a == b,
            (Self::Composite(a), Self::Composite(b)) => a.name() == b.name(),
            (Self::Collection(a), Self::Collection(b)) => a == b,
            (Self::Any, Self::Any) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection(name) => write!(f, "{}[]", name),
            _ => write!(f, "{}", self.type_name()),
        }
    }
}
