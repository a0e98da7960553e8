mod build;
mod check;


pub(crate) use check::mismatch;

use crate::{
    def::ValidateFn,
    path,
    resolve::Resolver,
    rule::Rule,
    schema::Schema,
    types::{Cardinality, ScalarBase},
    value::Value,
};
use serde::Serialize;
use std::{
    collections::BTreeSet,
    fmt::{self, Debug},
};

///
/// Mode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    Full,
    /// Patch validation: omitted or null fields are not required-ness violations.
    Partial,
}

///
/// CheckContext
/// resolver and mode threaded through a single check
///

#[derive(Clone, Copy)]
pub struct CheckContext<'r> {
    pub resolver: &'r dyn Resolver,
    pub mode: Mode,
}

impl<'r> CheckContext<'r> {
    #[must_use]
    pub const fn new(resolver: &'r dyn Resolver, mode: Mode) -> Self {
        Self { resolver, mode }
    }

    /// Same resolver, full mode; used below collection and reference boundaries.
    #[must_use]
    pub const fn full(self) -> Self {
        Self {
            resolver: self.resolver,
            mode: Mode::Full,
        }
    }

    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.mode == Mode::Partial
    }
}

///
/// Relation
/// entity-to-entity edge implied by a reference node
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Relation {
    pub to: String,
    pub cardinality: Cardinality,
}

///
/// TypeNode
///
/// Compiled unit of the type tree. Cycles between entities only ever go
/// through `Reference` names, never through owned structure.
///

#[derive(Clone)]
pub struct TypeNode {
    pub required: bool,
    pub kind: NodeKind,
    pub rules: Vec<Rule>,
    pub validate: Option<ValidateFn>,

    /// Type names and entity names this node depends on, transitively.
    pub references: BTreeSet<String>,
    pub relations: BTreeSet<Relation>,
}

///
/// NodeKind
///

#[derive(Clone, Debug)]
#[remain::sorted]
pub enum NodeKind {
    Array(Box<TypeNode>),
    Enum(Vec<Value>),
    Map(Keyed),
    Object(Keyed),
    Reference(Reference),
    Scalar(Scalar),
    Schema(Box<Schema>),
    Set(Box<TypeNode>),
    Tuple(Vec<Position>),
}

impl NodeKind {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Array(_) => "array",
            Self::Enum(_) => "enum",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
            Self::Reference(_) => "reference",
            Self::Scalar(_) => "scalar",
            Self::Schema(_) => "schema",
            Self::Set(_) => "set",
            Self::Tuple(_) => "tuple",
        }
    }
}

///
/// Scalar
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Scalar {
    /// Type name as written (`string`, or a custom type like `datetime`).
    pub name: String,
    pub base: ScalarBase,
}

///
/// Keyed
/// key and value node of an object or map
///

#[derive(Clone, Debug)]
pub struct Keyed {
    pub key: Box<TypeNode>,
    pub value: Box<TypeNode>,
}

///
/// Position
///

#[derive(Clone, Debug)]
pub struct Position {
    pub name: Option<String>,
    pub node: TypeNode,
}

impl Position {
    /// Label rendered into paths: the given name or `item<N>`.
    #[must_use]
    pub fn label(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("item{index}"))
    }
}

///
/// Reference
///

#[derive(Clone, Debug)]
pub struct Reference {
    pub to: String,
    pub cardinality: Cardinality,

    /// Singular element node, present for plural references.
    pub element: Option<Box<TypeNode>>,
}

impl TypeNode {
    pub(crate) fn new(kind: NodeKind) -> Self {
        let mut node = Self {
            required: true,
            kind,
            rules: Vec::new(),
            validate: None,
            references: BTreeSet::new(),
            relations: BTreeSet::new(),
        };
        node.collect_references();

        node
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        !self.required
    }

    /// Check a value (or its absence) at `path`.
    ///
    /// Absent optional values pass. Otherwise the variant's own type check
    /// runs, then the `validate` hook, then rules; the first failing step
    /// returns its messages.
    #[must_use]
    pub fn check(&self, value: Option<&Value>, path: &str, ctx: CheckContext<'_>) -> Vec<String> {
        let value = match value {
            Some(v) if !v.is_null() => v,
            _ => {
                return if self.required && !ctx.is_partial() {
                    vec![path::issue(path, "is required")]
                } else {
                    Vec::new()
                };
            }
        };

        let errors = self.check_type(value, path, ctx);
        if !errors.is_empty() {
            return errors;
        }

        if let Some(validate) = &self.validate {
            let errors = hook_issues(validate(value, path), path);
            if !errors.is_empty() {
                return errors;
            }
        }

        for rule in &self.rules {
            if let Some(message) = rule.check(value) {
                return vec![path::issue(path, message)];
            }
        }

        Vec::new()
    }

    // union of child references and relations, plus the node's own
    fn collect_references(&mut self) {
        let mut references = BTreeSet::new();
        let mut relations = BTreeSet::new();

        let children: Vec<&Self> = match &self.kind {
            NodeKind::Array(element) | NodeKind::Set(element) => vec![element.as_ref()],
            NodeKind::Map(keyed) | NodeKind::Object(keyed) => {
                vec![keyed.key.as_ref(), keyed.value.as_ref()]
            }
            NodeKind::Tuple(positions) => positions.iter().map(|p| &p.node).collect(),
            _ => Vec::new(),
        };
        for child in children {
            references.extend(child.references.iter().cloned());
            relations.extend(child.relations.iter().cloned());
        }

        match &self.kind {
            NodeKind::Schema(schema) => {
                references.extend(schema.references.iter().cloned());
                relations.extend(schema.relations.iter().cloned());
            }
            NodeKind::Scalar(scalar) => {
                references.insert(scalar.name.clone());
            }
            NodeKind::Reference(reference) => {
                references.insert(reference.to.clone());
                relations.insert(Relation {
                    to: reference.to.clone(),
                    cardinality: reference.cardinality,
                });
            }
            _ => {}
        }

        self.references = references;
        self.relations = relations;
    }
}

impl Debug for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeNode")
            .field("required", &self.required)
            .field("kind", &self.kind)
            .field("rules", &self.rules)
            .field("validate", &self.validate.is_some())
            .finish_non_exhaustive()
    }
}

/// Prefix hook messages with their path unless they already carry one.
/// Messages raised at the root path are kept as written.
pub(crate) fn hook_issues(messages: Vec<String>, path: &str) -> Vec<String> {
    messages
        .into_iter()
        .map(|message| {
            if path.is_empty() || message.starts_with("Field \"") {
                message
            } else {
                path::issue(path, message)
            }
        })
        .collect()
}
