//! Classification of raw definition fragments.
//!
//! Every fragment is decided by static shape rules into one `Fragment`
//! variant; node and schema construction dispatch on the result.

use crate::{
    def::{Def, Func},
    error::{Error, Result},
    resolve::Resolver,
    schema::Kind,
};

/// Record keys that introduce a short-hand type.
pub const SHORTHANDS: [&str; 9] = [
    "array", "enum", "many", "map", "object", "one", "schema", "set", "tuple",
];

/// Container names usable as a long-form `type`.
const LONG_FORM_CONTAINERS: [&str; 7] = ["array", "enum", "map", "object", "schema", "set", "tuple"];

#[must_use]
pub fn is_shorthand(key: &str) -> bool {
    SHORTHANDS.contains(&key)
}

/// Entity names start with an upper-case letter.
#[must_use]
pub fn is_entity_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Split a leading `?` optional marker off a type name.
#[must_use]
pub fn split_optional(name: &str) -> (&str, bool) {
    match name.strip_prefix('?') {
        Some(rest) => (rest, false),
        None => (name, true),
    }
}

/// Kind carried by a definition's leading tag, if any.
#[must_use]
pub fn leading_kind(def: &Def) -> Option<Kind> {
    let (key, _) = def.as_record()?.first()?;
    if is_entity_name(key) {
        Kind::from_tag(key)
    } else {
        None
    }
}

///
/// Fragment
///

#[derive(Debug)]
pub enum Fragment<'a> {
    /// Implicit struct: the record is itself a field map.
    Struct(&'a [(String, Def)]),

    /// Leading kind tag; `body` is the tag's value, `fields` the rest.
    Tagged {
        kind: Kind,
        body: &'a Def,
        fields: &'a [(String, Def)],
    },

    Typed(Typed<'a>),

    /// Fixed-length ordered list of positional definitions.
    Tuple(&'a [Def]),

    /// Function value; stored verbatim, never a type node.
    Skip(&'a Func),
}

///
/// Typed
/// a named type with its options, from a string, long form, or short-hand
///

#[derive(Debug)]
pub struct Typed<'a> {
    pub name: &'a str,
    pub required: bool,

    /// Value of the short-hand key (`{ array: 'number' }` → `'number'`).
    pub payload: Option<&'a Def>,

    pub options: &'a [(String, Def)],
    pub def: &'a Def,
}

impl<'a> Typed<'a> {
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&'a Def> {
        self.options.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Short-hand payload, falling back to the named long-form option.
    #[must_use]
    pub fn payload_or(&self, key: &str) -> Option<&'a Def> {
        self.payload.or_else(|| self.option(key))
    }
}

///
/// Preprocessor
///

pub struct Preprocessor<'r> {
    resolver: &'r dyn Resolver,
}

impl<'r> Preprocessor<'r> {
    #[must_use]
    pub const fn new(resolver: &'r dyn Resolver) -> Self {
        Self { resolver }
    }

    #[must_use]
    pub const fn resolver(&self) -> &'r dyn Resolver {
        self.resolver
    }

    pub fn parse<'a>(&self, def: &'a Def) -> Result<Fragment<'a>> {
        match def {
            Def::List(items) => Ok(Fragment::Tuple(items)),
            Def::Text(name) => self.parse_name(name, def),
            Def::Func(func) => Ok(Fragment::Skip(func)),
            Def::Record(entries) => self.parse_record(entries, def),
            Def::Null | Def::Bool(_) | Def::Number(_) => {
                Err(Error::invalid_definition(def, "unrecognized definition shape"))
            }
        }
    }

    fn parse_name<'a>(&self, name: &'a str, def: &'a Def) -> Result<Fragment<'a>> {
        let (name, required) = split_optional(name);
        if !is_entity_name(name) && self.resolver.find_type(name).is_none() {
            return Err(Error::invalid_definition(
                def,
                format!("unknown type name '{name}'"),
            ));
        }

        Ok(Fragment::Typed(Typed {
            name,
            required,
            payload: None,
            options: &[],
            def,
        }))
    }

    fn parse_record<'a>(
        &self,
        entries: &'a [(String, Def)],
        def: &'a Def,
    ) -> Result<Fragment<'a>> {
        let Some((first, first_def)) = entries.first() else {
            return Ok(Fragment::Struct(entries));
        };

        // kind tag
        if is_entity_name(first) {
            let kind = Kind::from_tag(first).ok_or_else(|| {
                Error::invalid_definition(def, format!("unknown kind tag '{first}'"))
            })?;

            return Ok(Fragment::Tagged {
                kind,
                body: first_def,
                fields: &entries[1..],
            });
        }

        // long form
        if let Some((_, Def::Text(type_name))) = entries.iter().find(|(k, _)| k == "type") {
            let (name, unmarked) = split_optional(type_name);
            self.check_long_form_name(name, def)?;

            return Ok(Fragment::Typed(Typed {
                name,
                required: unmarked && required_option(entries)?,
                payload: None,
                options: entries,
                def,
            }));
        }

        // short-hand
        if is_shorthand(first) {
            let options = &entries[1..];

            return Ok(Fragment::Typed(Typed {
                name: first,
                required: required_option(options)?,
                payload: Some(first_def),
                options,
                def,
            }));
        }

        Ok(Fragment::Struct(entries))
    }

    fn check_long_form_name(&self, name: &str, def: &Def) -> Result<()> {
        if is_entity_name(name)
            || LONG_FORM_CONTAINERS.contains(&name)
            || self.resolver.find_type(name).is_some()
        {
            Ok(())
        } else {
            Err(Error::invalid_definition(
                def,
                format!("unknown type name '{name}'"),
            ))
        }
    }
}

// `required` defaults to true and must be a boolean when given
fn required_option(options: &[(String, Def)]) -> Result<bool> {
    match options.iter().find(|(k, _)| k == "required") {
        None => Ok(true),
        Some((_, Def::Bool(b))) => Ok(*b),
        Some((_, other)) => Err(Error::invalid_definition(
            other,
            "required must be a boolean",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRegistry;
    use serde_json::json;

    fn parse_with<T>(def: serde_json::Value, f: impl FnOnce(Result<Fragment<'_>>) -> T) -> T {
        let registry = TypeRegistry::new();
        let def = Def::from(def);
        let pre = Preprocessor::new(&registry);

        f(pre.parse(&def))
    }

    #[test]
    fn optional_marker_on_type_names() {
        parse_with(json!("?string"), |fragment| match fragment {
            Ok(Fragment::Typed(typed)) => {
                assert_eq!(typed.name, "string");
                assert!(!typed.required);
            }
            other => panic!("expected typed fragment, got {other:?}"),
        });
    }

    #[test]
    fn upper_case_names_are_references() {
        parse_with(json!("Company"), |fragment| {
            assert!(matches!(fragment, Ok(Fragment::Typed(Typed { name: "Company", .. }))));
        });
    }

    #[test]
    fn unknown_type_name_fails() {
        parse_with(json!("strnig"), |fragment| {
            let err = fragment.expect_err("typo should not parse");
            assert!(err.to_string().contains("unknown type name 'strnig'"));
        });
    }

    #[test]
    fn leading_upper_key_is_a_kind_tag() {
        parse_with(
            json!({ "Entity": { "scope": "global" }, "name": "string" }),
            |fragment| match fragment {
                Ok(Fragment::Tagged { kind, fields, .. }) => {
                    assert_eq!(kind, Kind::Entity);
                    assert_eq!(fields.len(), 1);
                    assert_eq!(fields[0].0, "name");
                }
                other => panic!("expected tagged fragment, got {other:?}"),
            },
        );
    }

    #[test]
    fn unknown_kind_tag_fails() {
        parse_with(json!({ "Thing": {}, "name": "string" }), |fragment| {
            assert!(fragment.is_err());
        });
    }

    #[test]
    fn type_key_selects_long_form() {
        parse_with(
            json!({ "type": "string", "required": false, "length": 10 }),
            |fragment| match fragment {
                Ok(Fragment::Typed(typed)) => {
                    assert_eq!(typed.name, "string");
                    assert!(!typed.required);
                    assert!(typed.option("length").is_some());
                    assert!(typed.payload.is_none());
                }
                other => panic!("expected typed fragment, got {other:?}"),
            },
        );
    }

    #[test]
    fn shorthand_forwards_sibling_options() {
        parse_with(json!({ "array": "number", "length": 3 }), |fragment| match fragment {
            Ok(Fragment::Typed(typed)) => {
                assert_eq!(typed.name, "array");
                assert_eq!(typed.payload.and_then(Def::as_str), Some("number"));
                assert_eq!(typed.options.len(), 1);
            }
            other => panic!("expected typed fragment, got {other:?}"),
        });
    }

    #[test]
    fn plain_records_are_structs() {
        parse_with(json!({ "city": "string", "zip": "?number" }), |fragment| {
            assert!(matches!(fragment, Ok(Fragment::Struct(fields)) if fields.len() == 2));
        });
    }

    #[test]
    fn lists_are_tuples_and_functions_skip() {
        parse_with(json!(["string", "number"]), |fragment| {
            assert!(matches!(fragment, Ok(Fragment::Tuple(items)) if items.len() == 2));
        });

        let registry = TypeRegistry::new();
        let def = Def::validator(|_, _| Vec::new());
        assert!(matches!(
            Preprocessor::new(&registry).parse(&def),
            Ok(Fragment::Skip(_))
        ));
    }

    #[test]
    fn bare_literals_are_rejected() {
        parse_with(json!(42), |fragment| {
            match fragment.expect_err("numbers are not definitions") {
                Error::InvalidDefinition { shape, .. } => assert_eq!(shape, "number"),
                other => panic!("unexpected error {other:?}"),
            }
        });
    }

    #[test]
    fn non_boolean_required_fails() {
        parse_with(json!({ "type": "string", "required": "yes" }), |fragment| {
            assert!(fragment.is_err());
        });
    }
}
