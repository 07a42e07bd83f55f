//! Filter expressions for building WHERE clauses.
//!
//! A [`FilterSpecification`](crate::criteria::FilterSpecification) lowers into
//! this tree so that a SQL-backed session can bind it directly.

use serde::{Deserialize, Serialize};

use exemplar_schema::{ScalarValue, Value};

use crate::error::{QueryError, QueryResult};

/// A filter value that can be used in comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// JSON value.
    Json(serde_json::Value),
    /// List of values.
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert a property value into a bindable filter value.
    ///
    /// References bind their key. Component values have no single column
    /// and are rejected; lower them through their sub-field paths instead.
    pub fn from_value(path: &str, value: &Value) -> QueryResult<Self> {
        Ok(match value {
            Value::Scalar(scalar) => Self::from(*scalar),
            Value::Text(s) => Self::String(s.clone()),
            Value::Json(json) => Self::Json(json.clone()),
            Value::Reference(key) => Self::from_value(path, key)?,
            Value::List(items) => Self::List(
                items
                    .iter()
                    .map(|item| Self::from_value(path, item))
                    .collect::<QueryResult<_>>()?,
            ),
            Value::Component(component) => {
                return Err(QueryError::invalid_filter(
                    path,
                    format!(
                        "component `{}` cannot be bound as a single value",
                        component.descriptor().name()
                    ),
                ));
            }
        })
    }
}

impl From<ScalarValue> for FilterValue {
    fn from(v: ScalarValue) -> Self {
        match v {
            ScalarValue::Char(c) => Self::String(c.to_string()),
            ScalarValue::Byte(n) => Self::Int(n.into()),
            ScalarValue::Short(n) => Self::Int(n.into()),
            ScalarValue::Int(n) => Self::Int(n.into()),
            ScalarValue::Long(n) => Self::Int(n),
            ScalarValue::Float(n) => Self::Float(n.into()),
            ScalarValue::Double(n) => Self::Float(n),
            ScalarValue::Bool(b) => Self::Bool(b),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// A conjunction of equality comparisons that can be converted to SQL.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// No filter (always true).
    #[default]
    None,
    /// Equals comparison. A null value renders as `IS NULL`.
    Equals(String, FilterValue),
    /// Logical AND of multiple filters.
    And(Vec<Filter>),
}

impl Filter {
    /// Create an empty filter (matches everything).
    pub fn none() -> Self {
        Self::None
    }

    /// Check if this filter is empty.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Create an equality filter.
    pub fn equals(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Equals(column.into(), value.into())
    }

    /// Create an AND filter.
    ///
    /// Empty filters are dropped; a single remaining filter is returned as is.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<_> = filters.into_iter().filter(|f| !f.is_none()).collect();
        match filters.len() {
            0 => Self::None,
            1 => filters.swap_remove(0),
            _ => Self::And(filters),
        }
    }

    /// Combine with another filter using AND.
    pub fn and_then(self, other: Filter) -> Self {
        if self.is_none() {
            return other;
        }
        if other.is_none() {
            return self;
        }
        match self {
            Self::And(mut filters) => {
                filters.push(other);
                Self::And(filters)
            }
            _ => Self::And(vec![self, other]),
        }
    }

    /// Count the comparisons in this filter.
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Equals(..) => 1,
            Self::And(filters) => filters.iter().map(Filter::len).sum(),
        }
    }

    /// Check if this filter has no comparisons.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Generate SQL for this filter with parameter placeholders.
    /// Returns (sql, params) where params are the values to bind.
    ///
    /// Placeholders are numbered from `param_offset + 1` in bind order.
    pub fn to_sql(&self, param_offset: usize) -> (String, Vec<FilterValue>) {
        let mut params = Vec::new();
        let sql = self.to_sql_with_params(param_offset, &mut params);
        (sql, params)
    }

    fn to_sql_with_params(&self, param_offset: usize, params: &mut Vec<FilterValue>) -> String {
        match self {
            Self::None => "TRUE".to_string(),

            Self::Equals(col, val) => {
                if val.is_null() {
                    format!("{} IS NULL", col)
                } else {
                    params.push(val.clone());
                    format!("{} = ${}", col, param_offset + params.len())
                }
            }

            Self::And(filters) => {
                if filters.is_empty() {
                    return "TRUE".to_string();
                }
                let parts: Vec<_> = filters
                    .iter()
                    .map(|f| f.to_sql_with_params(param_offset, params))
                    .collect();
                format!("({})", parts.join(" AND "))
            }
        }
    }
}
