use crate::def::Def;
use serde::Serialize;
use std::fmt::{self, Display};

///
/// IndexKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Primary,
    Unique,
    Index,
    /// Hint derived from a plural reference field.
    Many,
}

impl IndexKind {
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "primary" => Some(Self::Primary),
            "unique" => Some(Self::Unique),
            "index" => Some(Self::Index),
            _ => None,
        }
    }
}

///
/// IndexSpec
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct IndexSpec {
    pub kind: IndexKind,
    pub fields: Vec<String>,

    /// Target entity for plural reference hints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl IndexSpec {
    /// Parse `{ primary|unique|index: ['field', ..] }`; any other shape is
    /// not an index declaration.
    #[must_use]
    pub fn from_def(def: &Def) -> Option<Self> {
        let [(key, Def::List(items))] = def.as_record()? else {
            return None;
        };
        let kind = IndexKind::from_key(key)?;
        let fields = items
            .iter()
            .map(|item| item.as_str().map(ToString::to_string))
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            kind,
            fields,
            target: None,
        })
    }

    #[must_use]
    pub fn many(field: &str, target: &str) -> Self {
        Self {
            kind: IndexKind::Many,
            fields: vec![field.to_string()],
            target: Some(target.to_string()),
        }
    }

    #[must_use]
    pub const fn is_unique(&self) -> bool {
        matches!(self.kind, IndexKind::Primary | IndexKind::Unique)
    }
}

impl Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields.join(", ");

        match self.kind {
            IndexKind::Primary => write!(f, "PRIMARY ({fields})"),
            IndexKind::Unique => write!(f, "UNIQUE ({fields})"),
            IndexKind::Index => write!(f, "({fields})"),
            IndexKind::Many => write!(
                f,
                "MANY ({fields}) -> {}",
                self.target.as_deref().unwrap_or_default()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_index_declarations() {
        let spec = IndexSpec::from_def(&Def::from(json!({ "unique": ["name", "country"] })))
            .expect("unique index");

        assert_eq!(spec.kind, IndexKind::Unique);
        assert_eq!(spec.fields, ["name", "country"]);
        assert!(spec.is_unique());
        assert_eq!(spec.to_string(), "UNIQUE (name, country)");
    }

    #[test]
    fn other_shapes_are_not_indexes() {
        assert!(IndexSpec::from_def(&Def::from(json!({ "array": ["x"] }))).is_none());
        assert!(IndexSpec::from_def(&Def::from(json!({ "index": "name" }))).is_none());
        assert!(IndexSpec::from_def(&Def::from(json!({ "index": [1] }))).is_none());
        assert!(IndexSpec::from_def(&Def::from(json!("string"))).is_none());
    }

    #[test]
    fn many_hint_names_its_target() {
        let spec = IndexSpec::many("members", "Person");

        assert_eq!(spec.to_string(), "MANY (members) -> Person");
        assert!(!spec.is_unique());
    }
}
