use crate::{
    node::{self, CheckContext},
    path::{self, PathSegment},
    preprocess::is_entity_name,
    resolve::Resolver,
    schema::{FieldDef, Schema, Shape},
    value::Value,
};

impl Schema {
    /// Walk a value against this schema at `path`.
    ///
    /// Every declared field is checked and every error kept; keys the schema
    /// does not declare are reported after the declared fields.
    pub(crate) fn check_value(
        &self,
        value: &Value,
        path: &str,
        ctx: CheckContext<'_>,
    ) -> Vec<String> {
        let fields = match &self.shape {
            Shape::Node(node) => return node.check(Some(value), path, ctx),
            Shape::Struct(fields) => fields,
        };
        let Value::Record(entries) = value else {
            return vec![node::mismatch(path, "object", value)];
        };

        let mut errors = Vec::new();

        for field in fields.iter() {
            let FieldDef::Node(node) = &field.def else {
                continue;
            };
            let field_path = path::join(path, PathSegment::Field(&field.ident));
            errors.extend(node.check(value.get(&field.ident), &field_path, ctx));
        }

        for (key, _) in entries {
            if !fields.contains(key) {
                let key_path = path::join(path, PathSegment::Field(key));
                errors.push(path::issue(&key_path, "is not expected"));
            }
        }

        if errors.is_empty()
            && !ctx.is_partial()
            && let Some(validate) = &self.options.validate
        {
            errors = node::hook_issues(validate(value, path), path);
        }

        errors
    }

    /// Names this schema depends on that `resolver` cannot find.
    #[must_use]
    pub fn check_consistency(&self, resolver: &dyn Resolver) -> Vec<String> {
        self.references
            .iter()
            .filter_map(|name| {
                if is_entity_name(name) {
                    resolver.find_schema(name).is_none().then(|| {
                        format!(
                            "Warning: \"{name}\" referenced by \"{}\" is not found",
                            self.name
                        )
                    })
                } else {
                    resolver.find_type(name).is_none().then(|| {
                        format!(
                            "Warning: type \"{name}\" is not found in \"{}\"",
                            self.name
                        )
                    })
                }
            })
            .collect()
    }
}
