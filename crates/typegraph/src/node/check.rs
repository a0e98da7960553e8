use crate::{
    node::{CheckContext, Keyed, NodeKind, Position, Reference, TypeNode},
    path::{self, PathSegment},
    types::Cardinality,
    value::Value,
};

impl TypeNode {
    /// The variant's own structural check for a present value.
    pub(crate) fn check_type(
        &self,
        value: &Value,
        path: &str,
        ctx: CheckContext<'_>,
    ) -> Vec<String> {
        match &self.kind {
            NodeKind::Scalar(scalar) => {
                if scalar.base.accepts(value) {
                    Vec::new()
                } else {
                    vec![path::issue(
                        path,
                        format!("not of expected type: {}", scalar.name),
                    )]
                }
            }
            NodeKind::Enum(members) => check_enum(members, value, path),
            NodeKind::Array(element) => match value {
                Value::List(items) => check_elements(element, items, path, ctx),
                _ => vec![mismatch(path, "array", value)],
            },
            NodeKind::Set(element) => match value {
                // JSON carries no set literal, so arrays stand in for sets
                Value::Set(items) | Value::List(items) => {
                    check_elements(element, items, path, ctx)
                }
                _ => vec![mismatch(path, "set", value)],
            },
            NodeKind::Object(keyed) => match value {
                Value::Record(entries) => check_record(keyed, entries, path, ctx),
                _ => vec![mismatch(path, "object", value)],
            },
            NodeKind::Map(keyed) => match value {
                Value::Map(entries) => entries
                    .iter()
                    .flat_map(|(key, item)| {
                        check_entry(keyed, key, item, &key.to_string(), path, ctx)
                    })
                    .collect(),
                Value::Record(entries) => check_record(keyed, entries, path, ctx),
                _ => vec![mismatch(path, "map", value)],
            },
            NodeKind::Tuple(positions) => check_tuple(positions, value, path, ctx),
            NodeKind::Reference(reference) => check_reference(reference, value, path, ctx),
            NodeKind::Schema(schema) => schema.check_value(value, path, ctx),
        }
    }
}

/// Structural mismatch for containers, reporting the runtime type.
pub(crate) fn mismatch(path: &str, expected: &str, value: &Value) -> String {
    path::issue(
        path,
        format!("not of expected type: {expected}, got: {}", value.type_name()),
    )
}

fn check_enum(members: &[Value], value: &Value, path: &str) -> Vec<String> {
    if members.contains(value) {
        return Vec::new();
    }

    let allowed = members
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    vec![path::issue(
        path,
        format!("value \"{value}\" is not in the allowed values: {allowed}"),
    )]
}

// every element is checked; each element stops at its own first failure
fn check_elements(
    element: &TypeNode,
    items: &[Value],
    path: &str,
    ctx: CheckContext<'_>,
) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .flat_map(|(i, item)| {
            element.check(Some(item), &path::join(path, PathSegment::Index(i)), ctx.full())
        })
        .collect()
}

fn check_record(
    keyed: &Keyed,
    entries: &[(String, Value)],
    path: &str,
    ctx: CheckContext<'_>,
) -> Vec<String> {
    entries
        .iter()
        .flat_map(|(key, item)| {
            check_entry(keyed, &Value::Text(key.clone()), item, key, path, ctx)
        })
        .collect()
}

fn check_entry(
    keyed: &Keyed,
    key: &Value,
    item: &Value,
    label: &str,
    path: &str,
    ctx: CheckContext<'_>,
) -> Vec<String> {
    let entry_path = path::join(path, PathSegment::Field(label));

    let mut errors = keyed.key.check(Some(key), &entry_path, ctx.full());
    errors.extend(keyed.value.check(Some(item), &entry_path, ctx.full()));

    errors
}

// declared length is an upper bound; missing trailing positions are not checked
fn check_tuple(
    positions: &[Position],
    value: &Value,
    path: &str,
    ctx: CheckContext<'_>,
) -> Vec<String> {
    let Value::List(items) = value else {
        return vec![mismatch(path, "tuple", value)];
    };

    if items.len() > positions.len() {
        return vec![path::issue(
            path,
            "value length is more then expected in tuple",
        )];
    }

    items
        .iter()
        .zip(positions)
        .enumerate()
        .flat_map(|(i, (item, position))| {
            let label = position.label(i);
            position.node.check(
                Some(item),
                &path::join(path, PathSegment::Position(&label)),
                ctx.full(),
            )
        })
        .collect()
}

fn check_reference(
    reference: &Reference,
    value: &Value,
    path: &str,
    ctx: CheckContext<'_>,
) -> Vec<String> {
    match (reference.cardinality, &reference.element) {
        (Cardinality::Many, Some(element)) => match value {
            Value::List(items) => check_elements(element, items, path, ctx),
            _ => vec![mismatch(path, "array", value)],
        },
        _ => match ctx.resolver.find_schema(&reference.to) {
            Some(target) => target.check_value(value, path, ctx.full()),
            None => vec![path::issue(
                path,
                format!("references unknown schema: {}", reference.to),
            )],
        },
    }
}
