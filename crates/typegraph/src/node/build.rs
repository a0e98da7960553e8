use crate::{
    def::{Def, Func},
    error::{Error, Result},
    node::{Keyed, NodeKind, Position, Reference, Scalar, TypeNode},
    preprocess::{Fragment, Preprocessor, Typed, is_entity_name, is_shorthand},
    rule::{Length, Rule},
    schema::Schema,
    types::Cardinality,
    value::Value,
};

impl TypeNode {
    /// Build a node from a raw definition fragment.
    pub fn build(def: &Def, pre: &Preprocessor<'_>) -> Result<Self> {
        match pre.parse(def)? {
            Fragment::Typed(typed) => Self::build_typed(&typed, pre),
            Fragment::Tuple(items) => Self::build_tuple(items, pre),
            Fragment::Struct(_) | Fragment::Tagged { .. } => {
                let schema = Schema::compile_with("", def, pre)?;
                Ok(Self::new(NodeKind::Schema(Box::new(schema))))
            }
            Fragment::Skip(_) => Err(Error::invalid_definition(def, "a function is not a type")),
        }
    }

    fn build_typed(typed: &Typed<'_>, pre: &Preprocessor<'_>) -> Result<Self> {
        let kind = match typed.name {
            "array" => NodeKind::Array(Box::new(element(typed, "value", pre)?)),
            "set" => NodeKind::Set(Box::new(element(typed, "value", pre)?)),
            "object" => NodeKind::Object(keyed(typed, pre)?),
            "map" => NodeKind::Map(keyed(typed, pre)?),
            "enum" => NodeKind::Enum(members(typed)?),
            "tuple" => {
                let items = match typed.payload_or("value") {
                    Some(Def::List(items)) => items,
                    _ => return Err(Error::invalid_definition(typed.def, "tuple needs a list")),
                };
                return Self::build_tuple(items, pre)?.with_options(typed);
            }
            "schema" => {
                let body = typed
                    .payload_or("schema")
                    .ok_or_else(|| Error::invalid_definition(typed.def, "schema needs a body"))?;
                NodeKind::Schema(Box::new(Schema::compile_with("", body, pre)?))
            }
            "one" | "many" => {
                let target = typed
                    .payload
                    .and_then(Def::as_str)
                    .filter(|name| is_entity_name(name))
                    .ok_or_else(|| {
                        Error::invalid_definition(typed.def, "reference needs an entity name")
                    })?;
                let cardinality = if typed.name == "many" {
                    Cardinality::Many
                } else {
                    Cardinality::One
                };
                NodeKind::Reference(reference(target, cardinality))
            }
            name if is_entity_name(name) => NodeKind::Reference(reference(name, Cardinality::One)),
            name => {
                let descriptor = pre.resolver().find_type(name).ok_or_else(|| {
                    Error::invalid_definition(typed.def, format!("unknown type name '{name}'"))
                })?;
                NodeKind::Scalar(Scalar {
                    name: name.to_string(),
                    base: descriptor.base,
                })
            }
        };

        Self::new(kind).with_options(typed)
    }

    fn build_tuple(items: &[Def], pre: &Preprocessor<'_>) -> Result<Self> {
        let positions = items
            .iter()
            .map(|item| position(item, pre))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(NodeKind::Tuple(positions)))
    }

    // required flag, length rule, validate hook
    fn with_options(mut self, typed: &Typed<'_>) -> Result<Self> {
        self.required = typed.required;

        if let Some(length) = typed.option("length") {
            self.rules.push(Rule::Length(Length::from_def(length)?));
        }

        match typed.option("validate") {
            None => {}
            Some(Def::Func(Func::Validate(f))) => self.validate = Some(f.clone()),
            Some(other) => {
                return Err(Error::invalid_definition(
                    other,
                    "validate must be a validation function",
                ));
            }
        }

        Ok(self)
    }
}

fn reference(target: &str, cardinality: Cardinality) -> Reference {
    let element = match cardinality {
        Cardinality::Many => Some(Box::new(TypeNode::new(NodeKind::Reference(reference(
            target,
            Cardinality::One,
        ))))),
        Cardinality::One => None,
    };

    Reference {
        to: target.to_string(),
        cardinality,
        element,
    }
}

fn element(typed: &Typed<'_>, key: &str, pre: &Preprocessor<'_>) -> Result<TypeNode> {
    let def = typed.payload_or(key).ok_or_else(|| {
        Error::invalid_definition(typed.def, format!("{} needs an element type", typed.name))
    })?;

    TypeNode::build(def, pre)
}

fn keyed(typed: &Typed<'_>, pre: &Preprocessor<'_>) -> Result<Keyed> {
    let value = element(typed, "value", pre)?;
    let key = match typed.option("key") {
        Some(def) => TypeNode::build(def, pre)?,
        None => TypeNode::build(&Def::from("string"), pre)?,
    };

    Ok(Keyed {
        key: Box::new(key),
        value: Box::new(value),
    })
}

fn members(typed: &Typed<'_>) -> Result<Vec<Value>> {
    let def = typed
        .payload
        .or_else(|| typed.option("enum"))
        .or_else(|| typed.option("values"));

    let Some(Def::List(items)) = def else {
        return Err(Error::invalid_definition(typed.def, "enum needs a list of values"));
    };

    items
        .iter()
        .map(|item| match item {
            Def::Text(_) | Def::Number(_) | Def::Bool(_) => {
                item.to_value().ok_or_else(|| Error::invalid_definition(item, "bad enum value"))
            }
            _ => Err(Error::invalid_definition(item, "enum values must be scalars")),
        })
        .collect()
}

// `{ x: 'number' }` names a position; any other shape is an unnamed position
fn position(item: &Def, pre: &Preprocessor<'_>) -> Result<Position> {
    if let Some([(name, def)]) = item.as_record()
        && !is_shorthand(name)
        && name != "type"
        && !is_entity_name(name)
    {
        return Ok(Position {
            name: Some(name.clone()),
            node: TypeNode::build(def, pre)?,
        });
    }

    Ok(Position {
        name: None,
        node: TypeNode::build(item, pre)?,
    })
}
