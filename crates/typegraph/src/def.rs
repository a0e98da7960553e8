//! Raw definition trees.
//!
//! A `Def` is what an external loader hands over after evaluating a
//! definition source: strings, ordered lists, ordered records, scalar
//! literals, and function hooks. Nothing here is interpreted; see
//! `preprocess` for classification.

use crate::value::Value;
use std::{
    fmt::{self, Debug, Display},
    sync::Arc,
};

/// Hook returning validation messages for `(value, path)`.
pub type ValidateFn = Arc<dyn Fn(&Value, &str) -> Vec<String> + Send + Sync>;

/// Hook mapping `(value, path)` to a new value.
pub type TransformFn = Arc<dyn Fn(&Value, &str) -> Value + Send + Sync>;

///
/// Func
///

#[derive(Clone)]
pub enum Func {
    Validate(ValidateFn),
    Transform(TransformFn),
}

impl Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validate(_) => f.write_str("Func::Validate(..)"),
            Self::Transform(_) => f.write_str("Func::Transform(..)"),
        }
    }
}

///
/// Def
///

#[derive(Clone, Debug)]
pub enum Def {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Self>),
    Record(Vec<(String, Self)>),
    Func(Func),
}

impl Def {
    /// Build a record definition, keeping entry order.
    pub fn record<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn validator<F>(f: F) -> Self
    where
        F: Fn(&Value, &str) -> Vec<String> + Send + Sync + 'static,
    {
        Self::Func(Func::Validate(Arc::new(f)))
    }

    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(&Value, &str) -> Value + Send + Sync + 'static,
    {
        Self::Func(Func::Transform(Arc::new(f)))
    }

    /// Runtime shape name, reported alongside invalid fragments.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "string",
            Self::List(_) => "list",
            Self::Record(_) => "record",
            Self::Func(_) => "function",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&[(String, Self)]> {
        match self {
            Self::Record(entries) => Some(entries),
            _ => None,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_record()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Convert a literal definition into a runtime value (enum members,
    /// type metadata). Functions have no value form.
    #[must_use]
    pub fn to_value(&self) -> Option<Value> {
        Some(match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(*n),
            Self::Text(s) => Value::Text(s.clone()),
            Self::List(items) => Value::List(
                items
                    .iter()
                    .map(Self::to_value)
                    .collect::<Option<Vec<_>>>()?,
            ),
            Self::Record(entries) => Value::Record(
                entries
                    .iter()
                    .map(|(k, v)| v.to_value().map(|v| (k.clone(), v)))
                    .collect::<Option<Vec<_>>>()?,
            ),
            Self::Func(_) => return None,
        })
    }
}

impl Display for Def {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", Value::Number(*n)),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Record(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Self::Func(_) => f.write_str("<function>"),
        }
    }
}

impl From<&str> for Def {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Def {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<Self>> for Def {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl From<serde_json::Value> for Def {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(entries) => Self::Record(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}
