use crate::{
    def::Def,
    error::{Error, Result},
    value::Value,
};
use derive_more::Display;
use serde::Serialize;
use std::collections::BTreeMap;

///
/// Cardinality
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    #[display("one")]
    One,
    #[display("many")]
    Many,
}

///
/// ScalarBase
/// runtime category a scalar or custom type checks against
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[remain::sorted]
pub enum ScalarBase {
    #[display("json")]
    Any,
    #[display("bigint")]
    BigInt,
    #[display("boolean")]
    Boolean,
    #[display("number")]
    Number,
    #[display("string")]
    String,
}

impl ScalarBase {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "json" => Some(Self::Any),
            "bigint" => Some(Self::BigInt),
            "boolean" => Some(Self::Boolean),
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    /// Runtime-type match for a present value.
    #[must_use]
    pub const fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::BigInt => matches!(value, Value::BigInt(_)),
            Self::Boolean => matches!(value, Value::Bool(_)),
            Self::Number => matches!(value, Value::Number(_)),
            Self::String => matches!(value, Value::Text(_)),
        }
    }
}

///
/// TypeDescriptor
/// a registered scalar type: built-in or caller-supplied
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypeDescriptor {
    pub name: String,
    pub base: ScalarBase,

    /// Opaque passthrough (e.g. a storage column type); never interpreted.
    #[serde(skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, base: ScalarBase) -> Self {
        Self {
            name: name.into(),
            base,
            metadata: Value::Null,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn is_builtin(&self) -> bool {
        BUILTIN_TYPES.contains(&self.name.as_str())
    }
}

/// Scalar type names every registry knows.
pub const BUILTIN_TYPES: [&str; 5] = ["bigint", "boolean", "json", "number", "string"];

///
/// TypeRegistry
/// built-in defaults merged with caller-supplied custom types
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Registry holding only the built-in scalar types.
    #[must_use]
    pub fn new() -> Self {
        let types = BUILTIN_TYPES
            .iter()
            .filter_map(|name| {
                ScalarBase::from_name(name)
                    .map(|base| ((*name).to_string(), TypeDescriptor::new(*name, base)))
            })
            .collect();

        Self { types }
    }

    /// Defaults plus the given custom types; custom entries replace defaults.
    #[must_use]
    pub fn with_custom(custom: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        let mut registry = Self::new();
        for descriptor in custom {
            registry.insert(descriptor);
        }

        registry
    }

    /// Build from a types definition record:
    /// `{ datetime: { base: 'string', metadata: {..} }, ident: 'number' }`.
    pub fn from_def(def: &Def) -> Result<Self> {
        let entries = def
            .as_record()
            .ok_or_else(|| Error::invalid_definition(def, "types must be a record"))?;

        let mut registry = Self::new();
        for (name, entry) in entries {
            registry.insert(parse_descriptor(name, entry)?);
        }

        Ok(registry)
    }

    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_descriptor(name: &str, entry: &Def) -> Result<TypeDescriptor> {
    let (base_name, metadata) = match entry {
        Def::Text(base) => (base.as_str(), Value::Null),
        Def::Record(_) => {
            let base = entry
                .get("base")
                .and_then(Def::as_str)
                .ok_or_else(|| Error::invalid_definition(entry, "custom type needs a base"))?;
            let metadata = entry
                .get("metadata")
                .and_then(Def::to_value)
                .unwrap_or(Value::Null);

            (base, metadata)
        }
        _ => return Err(Error::invalid_definition(entry, "unrecognized type shape")),
    };

    let base = ScalarBase::from_name(base_name).ok_or_else(|| {
        Error::invalid_definition(entry, format!("unknown base type '{base_name}'"))
    })?;

    Ok(TypeDescriptor::new(name, base).with_metadata(metadata))
}
