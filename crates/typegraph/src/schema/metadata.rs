use crate::{
    def::Def,
    error::{Error, Result},
};
use convert_case::{Case, Casing};
use derive_more::Display;
use serde::Serialize;
use std::fmt;

///
/// Kind
/// storage/role classification carried by a definition's leading tag
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Kind {
    #[default]
    Schema,
    Registry,
    Entity,
    Dictionary,
    Journal,
    Details,
    Relation,
    View,
    Struct,
    Scalar,
    Form,
    Projection,
}

impl Kind {
    pub const ALL: [Self; 12] = [
        Self::Schema,
        Self::Registry,
        Self::Entity,
        Self::Dictionary,
        Self::Journal,
        Self::Details,
        Self::Relation,
        Self::View,
        Self::Struct,
        Self::Scalar,
        Self::Form,
        Self::Projection,
    ];

    /// Tag spelling as written in definitions.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Schema => "Schema",
            Self::Registry => "Registry",
            Self::Entity => "Entity",
            Self::Dictionary => "Dictionary",
            Self::Journal => "Journal",
            Self::Details => "Details",
            Self::Relation => "Relation",
            Self::View => "View",
            Self::Struct => "Struct",
            Self::Scalar => "Scalar",
            Self::Form => "Form",
            Self::Projection => "Projection",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Lower-camel name stored in metadata.
    #[must_use]
    pub fn name(self) -> String {
        self.tag().to_case(Case::Camel)
    }

    /// Kinds backed by a persistent store.
    #[must_use]
    pub const fn is_stored(self) -> bool {
        matches!(
            self,
            Self::Registry
                | Self::Entity
                | Self::Dictionary
                | Self::Journal
                | Self::Details
                | Self::Relation
                | Self::View
        )
    }

    /// Derived kinds read sibling schemas and compile last.
    #[must_use]
    pub const fn is_derived(self) -> bool {
        matches!(self, Self::Projection)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

///
/// Scope
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[display("application")]
    Application,
    #[display("global")]
    Global,
    #[display("local")]
    Local,
}

impl Scope {
    fn parse(def: &Def) -> Result<Self> {
        match def.as_str() {
            Some("application") => Ok(Self::Application),
            Some("global") => Ok(Self::Global),
            Some("local") => Ok(Self::Local),
            _ => Err(Error::invalid_definition(def, "unknown scope")),
        }
    }
}

///
/// Store
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Store {
    #[display("persistent")]
    Persistent,
    #[display("memory")]
    Memory,
}

impl Store {
    fn parse(def: &Def) -> Result<Self> {
        match def.as_str() {
            Some("persistent") => Ok(Self::Persistent),
            Some("memory") => Ok(Self::Memory),
            _ => Err(Error::invalid_definition(def, "unknown store")),
        }
    }
}

///
/// Allow
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Allow {
    #[display("write")]
    Write,
    #[display("append")]
    Append,
    #[display("read")]
    Read,
}

impl Allow {
    fn parse(def: &Def) -> Result<Self> {
        match def.as_str() {
            Some("write") => Ok(Self::Write),
            Some("append") => Ok(Self::Append),
            Some("read") => Ok(Self::Read),
            _ => Err(Error::invalid_definition(def, "unknown allow mode")),
        }
    }
}

///
/// Metadata
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Metadata {
    pub kind: Kind,
    pub scope: Scope,
    pub store: Store,
    pub allow: Allow,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl Metadata {
    /// Defaults implied by a kind.
    #[must_use]
    pub fn for_kind(kind: Kind) -> Self {
        let (scope, store) = if kind.is_stored() {
            (Scope::Application, Store::Persistent)
        } else {
            (Scope::Local, Store::Memory)
        };
        let allow = match kind {
            Kind::Journal => Allow::Append,
            Kind::View => Allow::Read,
            _ => Allow::Write,
        };

        Self {
            kind,
            scope,
            store,
            allow,
            parent: None,
        }
    }

    /// Merge explicit options from a tag body; explicit values win.
    pub fn merge(&mut self, body: &Def) -> Result<()> {
        let entries = match body {
            Def::Null => return Ok(()),
            Def::Record(entries) => entries,
            _ => return Err(Error::invalid_definition(body, "kind tag body must be a record")),
        };

        for (key, value) in entries {
            match key.as_str() {
                "scope" => self.scope = Scope::parse(value)?,
                "store" => self.store = Store::parse(value)?,
                "allow" => self.allow = Allow::parse(value)?,
                "parent" | "schema" => {
                    let parent = value.as_str().ok_or_else(|| {
                        Error::invalid_definition(value, "parent must be an entity name")
                    })?;
                    self.parent = Some(parent.to_string());
                }
                _ => {}
            }
        }

        Ok(())
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::for_kind(Kind::Schema)
    }
}
