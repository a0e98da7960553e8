//! Linking namespace over many named schemas.
//!
//! A `Model` compiles every entity of a source, resolves names between them,
//! and computes a dependency order. Unresolved or cyclic references become
//! warnings; only malformed definitions fail construction.

mod order;

#[cfg(test)]
mod tests;

use crate::{
    config::LinkConfig,
    def::Def,
    error::{Error, Result},
    preprocess::leading_kind,
    resolve::Resolver,
    schema::{CheckResult, Kind, Schema},
    types::{TypeDescriptor, TypeRegistry},
    value::Value,
};
use std::collections::{BTreeMap, BTreeSet};

/// Source entry holding custom type definitions.
pub const TYPES_ENTRY: &str = ".types";

/// Source entry holding opaque database metadata.
pub const DATABASE_ENTRY: &str = ".database";

///
/// ModelSource
/// already-evaluated definitions handed over by a loader
///

#[derive(Clone, Debug, Default)]
pub struct ModelSource {
    pub types: TypeRegistry,
    pub entities: Vec<(String, Def)>,
    pub database: Option<Value>,
}

impl ModelSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_types(mut self, types: TypeRegistry) -> Self {
        self.types = types;
        self
    }

    #[must_use]
    pub fn entity(mut self, name: impl Into<String>, def: impl Into<Def>) -> Self {
        self.entities.push((name.into(), def.into()));
        self
    }

    #[must_use]
    pub fn with_database(mut self, database: Value) -> Self {
        self.database = Some(database);
        self
    }

    /// Split loader entries into types, database metadata and entities.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Def)>) -> Result<Self> {
        let mut source = Self::new();

        for (name, def) in entries {
            match name.as_str() {
                TYPES_ENTRY => source.types = TypeRegistry::from_def(&def)?,
                DATABASE_ENTRY => {
                    let database = def.to_value().ok_or_else(|| {
                        Error::invalid_definition(&def, "database metadata must be plain data")
                    })?;
                    source.database = Some(database);
                }
                _ => source.entities.push((name, def)),
            }
        }

        Ok(source)
    }
}

///
/// Model
///

#[derive(Debug)]
pub struct Model {
    types: TypeRegistry,
    entities: Vec<Schema>,
    by_name: BTreeMap<String, usize>,
    order: Vec<String>,
    warnings: Vec<String>,
    database: Option<Value>,
    config: LinkConfig,
}

impl Model {
    /// Compile and link every entity of `source`.
    ///
    /// Derived kinds compile after all others so they can read the
    /// already-compiled shape of the schemas they project from. Among
    /// themselves they compile parents first.
    pub fn new(source: ModelSource, config: &LinkConfig) -> Result<Self> {
        config.validate()?;

        let ModelSource {
            types,
            entities: defs,
            database,
        } = source;

        let mut seen = BTreeSet::new();
        for (name, _) in &defs {
            if !seen.insert(name.as_str()) {
                return Err(Error::DuplicateEntity(name.clone()));
            }
        }

        let (derived, primary): (Vec<_>, Vec<_>) = defs
            .iter()
            .partition(|(_, def)| leading_kind(def).is_some_and(Kind::is_derived));

        let mut model = Self {
            types,
            entities: Vec::with_capacity(defs.len()),
            by_name: BTreeMap::new(),
            order: Vec::new(),
            warnings: Vec::new(),
            database,
            config: config.clone(),
        };

        for (name, def) in primary.into_iter().chain(parents_first(derived)) {
            let schema = Schema::compile(name, def, &model)?;
            model.by_name.insert(name.clone(), model.entities.len());
            model.entities.push(schema);
        }

        let (order, warnings) = model.link();
        model.order = order;
        model.warnings = warnings;
        log::debug!(
            "linked model: {} entities, {} warnings",
            model.entities.len(),
            model.warnings.len()
        );

        Ok(model)
    }

    // consistency over non-internal entities, then dependency order
    fn link(&self) -> (Vec<String>, Vec<String>) {
        let mut warnings = self
            .public_entities()
            .flat_map(|schema| schema.check_consistency(self))
            .collect::<Vec<_>>();

        let (order, recursion) = order::dependency_order(self, &self.config.bootstrap_entity);
        warnings.extend(recursion);

        if self.config.log_warnings {
            for warning in &warnings {
                log::warn!("{warning}");
            }
        }

        (order, warnings)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.by_name
            .get(name)
            .and_then(|&i| self.entities.get(i))
    }

    /// Full check of `value` against entity `name`; `None` if no such entity.
    #[must_use]
    pub fn check(&self, name: &str, value: &Value) -> Option<CheckResult> {
        self.get(name).map(|schema| schema.check_with(value, self))
    }

    #[must_use]
    pub fn partial_check(&self, name: &str, value: &Value) -> Option<CheckResult> {
        self.get(name)
            .map(|schema| schema.partial_check_with(value, self))
    }

    /// Entity names in compilation order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|schema| schema.name.as_str())
    }

    pub fn entities(&self) -> impl Iterator<Item = &Schema> {
        self.entities.iter()
    }

    /// Non-internal entities, which alone are ordered and consistency-checked.
    pub fn public_entities(&self) -> impl Iterator<Item = &Schema> {
        self.entities
            .iter()
            .filter(|schema| !self.config.is_internal(&schema.name))
    }

    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    #[must_use]
    pub const fn database(&self) -> Option<&Value> {
        self.database.as_ref()
    }

    #[must_use]
    pub const fn types(&self) -> &TypeRegistry {
        &self.types
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

// derived definitions reordered so each follows the derived parent it reads from;
// a cycle among them keeps declaration order and is reported by the ordering pass
fn parents_first(mut pending: Vec<&(String, Def)>) -> Vec<&(String, Def)> {
    let mut ordered = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let ready = pending.iter().position(|(name, def)| {
            derived_parent(def).is_none_or(|parent| {
                parent == name.as_str()
                    || !pending.iter().any(|(other, _)| other.as_str() == parent)
            })
        });

        match ready {
            Some(i) => ordered.push(pending.remove(i)),
            None => ordered.append(&mut pending),
        }
    }

    ordered
}

// `{ Projection: { schema: 'Account', .. } }` names `Account`
fn derived_parent(def: &Def) -> Option<&str> {
    let (_, body) = def.as_record()?.first()?;

    body.get("schema")
        .or_else(|| body.get("parent"))
        .and_then(Def::as_str)
}

impl Resolver for Model {
    fn find_schema(&self, name: &str) -> Option<&Schema> {
        self.get(name)
    }

    fn find_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }
}
