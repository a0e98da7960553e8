use crate::{model::Model, preprocess::is_entity_name, schema::Schema};
use std::collections::BTreeMap;

///
/// Visit
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

///
/// Ordering
/// depth-first walk over entity dependencies
///

struct Ordering<'a> {
    model: &'a Model,
    state: BTreeMap<&'a str, Visit>,
    order: Vec<String>,
    warnings: Vec<String>,
}

impl<'a> Ordering<'a> {
    fn visit(&mut self, schema: &'a Schema) {
        let name = schema.name.as_str();
        if self.state.get(name) != Some(&Visit::Unvisited) {
            return;
        }
        self.state.insert(name, Visit::InProgress);

        for dep in dependencies(schema) {
            if dep == name {
                continue;
            }

            // unknown and internal names are left to consistency warnings
            match self.state.get(dep) {
                Some(Visit::Unvisited) => {
                    if let Some(target) = self.model.get(dep) {
                        self.visit(target);
                    }
                }
                Some(Visit::InProgress) => {
                    self.warnings
                        .push(format!("Recursive dependency: {name}.{dep}"));
                }
                Some(Visit::Done) | None => {}
            }
        }

        self.state.insert(name, Visit::Done);
        self.order.push(name.to_string());
    }
}

// entity names a schema refers to, in name order
fn dependencies(schema: &Schema) -> impl Iterator<Item = &str> {
    schema
        .references
        .iter()
        .map(String::as_str)
        .filter(|name| is_entity_name(name))
}

/// Order non-internal entities so that dependencies come first.
///
/// The bootstrap entity, when present, is placed first. Each back-edge found
/// during the walk yields one `Recursive dependency` warning.
pub(super) fn dependency_order(model: &Model, bootstrap: &str) -> (Vec<String>, Vec<String>) {
    let mut walk = Ordering {
        model,
        state: model
            .public_entities()
            .map(|schema| (schema.name.as_str(), Visit::Unvisited))
            .collect(),
        order: Vec::new(),
        warnings: Vec::new(),
    };

    if let Some(seed) = model.public_entities().find(|schema| schema.name == bootstrap) {
        walk.state.insert(seed.name.as_str(), Visit::Done);
        walk.order.push(seed.name.clone());
    }

    for schema in model.public_entities() {
        walk.visit(schema);
    }

    (walk.order, walk.warnings)
}
