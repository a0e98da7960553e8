mod build;
mod check;
mod index;
mod metadata;


pub use index::{IndexKind, IndexSpec};
pub use metadata::{Allow, Kind, Metadata, Scope, Store};

use crate::{
    def::{Def, Func, TransformFn, ValidateFn},
    error::Result,
    node::{CheckContext, Mode, Relation, TypeNode},
    preprocess::Preprocessor,
    resolve::{BUILTIN, Resolver},
    value::Value,
};
use serde::Serialize;
use std::{
    collections::BTreeSet,
    fmt::{self, Debug},
};

///
/// Schema
///
/// A named, compiled entity: either a field list or a single wrapped node,
/// plus metadata, index declarations and user hooks. Immutable once built.
///

#[derive(Clone, Debug)]
pub struct Schema {
    pub name: String,
    pub shape: Shape,
    pub metadata: Metadata,
    pub indexes: Vec<(String, IndexSpec)>,
    pub options: SchemaOptions,

    pub references: BTreeSet<String>,
    pub relations: BTreeSet<Relation>,
}

impl Schema {
    /// Compile against the built-in type registry only.
    pub fn new(name: &str, def: &Def) -> Result<Self> {
        Self::compile(name, def, &*BUILTIN)
    }

    /// Compile with `resolver` supplying custom types and, for projections,
    /// sibling schemas.
    pub fn compile(name: &str, def: &Def, resolver: &dyn Resolver) -> Result<Self> {
        let schema = Self::compile_with(name, def, &Preprocessor::new(resolver))?;
        log::debug!(
            "compiled schema '{name}' ({}, {} fields)",
            schema.metadata.kind,
            schema.fields().map_or(0, FieldList::len)
        );

        Ok(schema)
    }

    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.metadata.kind
    }

    /// Declared fields, when the schema is struct-shaped.
    #[must_use]
    pub const fn fields(&self) -> Option<&FieldList> {
        match &self.shape {
            Shape::Struct(fields) => Some(fields),
            Shape::Node(_) => None,
        }
    }

    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexSpec> {
        self.indexes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, spec)| spec)
    }

    //
    // checks
    //

    /// Full check with built-in types only; references cannot resolve.
    #[must_use]
    pub fn check(&self, value: &Value) -> CheckResult {
        self.check_with(value, &*BUILTIN)
    }

    #[must_use]
    pub fn check_with(&self, value: &Value, resolver: &dyn Resolver) -> CheckResult {
        CheckResult::from_errors(self.check_value(value, "", CheckContext::new(resolver, Mode::Full)))
    }

    /// Patch check: missing or null fields are accepted.
    #[must_use]
    pub fn partial_check(&self, value: &Value) -> CheckResult {
        self.partial_check_with(value, &*BUILTIN)
    }

    #[must_use]
    pub fn partial_check_with(&self, value: &Value, resolver: &dyn Resolver) -> CheckResult {
        CheckResult::from_errors(self.check_value(
            value,
            "",
            CheckContext::new(resolver, Mode::Partial),
        ))
    }

    //
    // hooks
    //

    #[must_use]
    pub fn parse(&self, value: &Value) -> Value {
        apply(self.options.parse.as_ref(), value)
    }

    #[must_use]
    pub fn serialize(&self, value: &Value) -> Value {
        apply(self.options.serialize.as_ref(), value)
    }

    #[must_use]
    pub fn format(&self, value: &Value) -> Value {
        apply(self.options.format.as_ref(), value)
    }
}

fn apply(hook: Option<&TransformFn>, value: &Value) -> Value {
    hook.map_or_else(|| value.clone(), |f| f(value, ""))
}

///
/// Shape
///

#[derive(Clone, Debug)]
pub enum Shape {
    Struct(FieldList),

    /// The schema itself is a scalar, tuple, collection or reference.
    Node(Box<TypeNode>),
}

///
/// FieldList
///

#[derive(Clone, Debug, Default)]
pub struct FieldList {
    pub fields: Vec<Field>,
}

impl FieldList {
    // get
    #[must_use]
    pub fn get(&self, ident: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.ident == ident)
    }

    #[must_use]
    pub fn contains(&self, ident: &str) -> bool {
        self.get(ident).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

///
/// Field
///

#[derive(Clone, Debug)]
pub struct Field {
    pub ident: String,
    pub def: FieldDef,
}

impl Field {
    #[must_use]
    pub const fn node(&self) -> Option<&TypeNode> {
        match &self.def {
            FieldDef::Node(node) => Some(node),
            FieldDef::Literal(_) => None,
        }
    }
}

///
/// FieldDef
///

#[derive(Clone, Debug)]
pub enum FieldDef {
    Node(TypeNode),

    /// Function value kept verbatim; never validated.
    Literal(Func),
}

///
/// SchemaOptions
///

#[derive(Clone, Default)]
pub struct SchemaOptions {
    pub validate: Option<ValidateFn>,
    pub parse: Option<TransformFn>,
    pub serialize: Option<TransformFn>,
    pub format: Option<TransformFn>,
}

impl SchemaOptions {
    pub const HOOKS: [&str; 4] = ["format", "parse", "serialize", "validate"];
}

impl Debug for SchemaOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaOptions")
            .field("validate", &self.validate.is_some())
            .field("parse", &self.parse.is_some())
            .field("serialize", &self.serialize.is_some())
            .field("format", &self.format.is_some())
            .finish()
    }
}

///
/// CheckResult
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl CheckResult {
    #[must_use]
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}
