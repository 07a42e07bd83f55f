//! Runtime values read from mapped entities.
//!
//! Absence is always modelled as `Option<Value>::None`; there is no null
//! variant. The fixed-width scalar kinds live in [`ScalarValue`], which is
//! the closed set the zero-value check covers.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::component::ComponentDescriptor;
use crate::types::ScalarType;

/// A value of one of the fixed-width scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    /// Character value.
    Char(char),
    /// 8-bit integer.
    Byte(i8),
    /// 16-bit integer.
    Short(i16),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Boolean value.
    Bool(bool),
}

impl ScalarValue {
    /// Check whether the value equals its kind's zero.
    ///
    /// Zero is `'\0'` for characters, `0` for integers, `0.0` for floats
    /// and `false` for booleans.
    pub fn is_zero(&self) -> bool {
        match *self {
            Self::Char(c) => c == '\0',
            Self::Byte(v) => v == 0,
            Self::Short(v) => v == 0,
            Self::Int(v) => v == 0,
            Self::Long(v) => v == 0,
            Self::Float(v) => v == 0.0,
            Self::Double(v) => v == 0.0,
            Self::Bool(v) => !v,
        }
    }

    /// Get the scalar type of this value.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Self::Char(_) => ScalarType::Char,
            Self::Byte(_) => ScalarType::Byte,
            Self::Short(_) => ScalarType::Short,
            Self::Int(_) => ScalarType::Int,
            Self::Long(_) => ScalarType::Long,
            Self::Float(_) => ScalarType::Float,
            Self::Double(_) => ScalarType::Double,
            Self::Bool(_) => ScalarType::Boolean,
        }
    }
}

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Fixed-width scalar.
    Scalar(ScalarValue),
    /// Character data.
    Text(String),
    /// JSON document.
    Json(serde_json::Value),
    /// Key of an associated entity.
    Reference(Box<Value>),
    /// Structured value described by a registered component.
    Component(ComponentValue),
    /// Collection of values.
    List(Vec<Value>),
}

impl Value {
    /// Get the scalar payload, if any.
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Get the text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the component payload, if any.
    pub fn as_component(&self) -> Option<&ComponentValue> {
        match self {
            Self::Component(c) => Some(c),
            _ => None,
        }
    }

    /// Check if this is a boolean scalar.
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Scalar(ScalarValue::Bool(_)))
    }

    /// Check if this is a scalar equal to its kind's zero.
    pub fn is_zero(&self) -> bool {
        self.as_scalar().is_some_and(ScalarValue::is_zero)
    }

    /// Wrap a key value as a reference to another entity.
    pub fn reference(key: impl Into<Value>) -> Self {
        Self::Reference(Box::new(key.into()))
    }
}

/// Check whether a value is the zero of its scalar kind.
///
/// Returns `false` for absent values and for every non-scalar value.
pub fn is_zero_value(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_zero)
}

impl From<ScalarValue> for Value {
    fn from(v: ScalarValue) -> Self {
        Self::Scalar(v)
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::Scalar(ScalarValue::$variant(v))
                }
            }
        )*
    };
}

scalar_from! {
    char => Char,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    bool => Bool,
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl From<ComponentValue> for Value {
    fn from(v: ComponentValue) -> Self {
        Self::Component(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// A structured value paired with the descriptor of its type.
///
/// Sub-fields are read through the descriptor's registered accessors.
#[derive(Clone)]
pub struct ComponentValue {
    descriptor: Arc<ComponentDescriptor>,
    inner: Arc<dyn Any + Send + Sync>,
}

impl ComponentValue {
    /// Wrap a component instance.
    pub fn new<C: Any + Send + Sync>(descriptor: Arc<ComponentDescriptor>, value: C) -> Self {
        Self {
            descriptor,
            inner: Arc::new(value),
        }
    }

    /// Get the descriptor this value was created with.
    pub fn descriptor(&self) -> &Arc<ComponentDescriptor> {
        &self.descriptor
    }

    /// Get the wrapped instance.
    pub fn inner(&self) -> &(dyn Any + Send + Sync) {
        &*self.inner
    }

    /// Downcast the wrapped instance.
    pub fn downcast_ref<C: Any>(&self) -> Option<&C> {
        self.inner.downcast_ref::<C>()
    }

    /// Read every sub-field in declaration order.
    ///
    /// Returns `None` when the wrapped instance is not of the descriptor's type.
    pub fn fields(&self) -> Option<Vec<(SmolStr, Option<Value>)>> {
        self.descriptor
            .fields()
            .iter()
            .map(|field| {
                field
                    .read(self.inner())
                    .map(|value| (SmolStr::from(field.name()), value))
            })
            .collect()
    }
}

/// Unreadable components (inner value of the wrong type) compare unequal,
/// even to themselves.
impl PartialEq for ComponentValue {
    fn eq(&self, other: &Self) -> bool {
        if self.descriptor.name() != other.descriptor.name() {
            return false;
        }
        match (self.fields(), other.fields()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.descriptor.name());
        match self.fields() {
            Some(fields) => {
                for (name, value) in &fields {
                    out.field(name, value);
                }
            }
            None => {
                out.field("<unreadable>", &self.descriptor.type_name());
            }
        }
        out.finish()
    }
}
