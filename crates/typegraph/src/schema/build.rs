use crate::{
    def::{Def, Func},
    error::{Error, Result},
    node::{NodeKind, TypeNode},
    preprocess::{Fragment, Preprocessor},
    schema::{
        Field, FieldDef, FieldList, IndexKind, IndexSpec, Kind, Metadata, Schema, SchemaOptions,
        Shape,
    },
    types::Cardinality,
};
use std::collections::BTreeSet;

impl Schema {
    pub(crate) fn compile_with(name: &str, def: &Def, pre: &Preprocessor<'_>) -> Result<Self> {
        let mut builder = Builder::new(name);

        match pre.parse(def)? {
            Fragment::Struct(fields) => builder.fields(fields, pre)?,
            Fragment::Tagged { kind, body, fields } => {
                builder.metadata = Metadata::for_kind(kind);
                builder.metadata.merge(body)?;
                if kind == Kind::Projection {
                    builder.project(body, pre)?;
                }
                builder.fields(fields, pre)?;
            }
            Fragment::Typed(_) | Fragment::Tuple(_) => {
                return Ok(builder.finish_node(TypeNode::build(def, pre)?));
            }
            Fragment::Skip(_) => {
                return Err(Error::invalid_definition(def, "a function is not a schema"));
            }
        }

        Ok(builder.finish())
    }
}

///
/// Builder
/// accumulates one schema's parts while its fields are compiled
///

struct Builder {
    name: String,
    metadata: Metadata,
    fields: Vec<Field>,
    indexes: Vec<(String, IndexSpec)>,
    options: SchemaOptions,
    references: BTreeSet<String>,
}

impl Builder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            metadata: Metadata::default(),
            fields: Vec::new(),
            indexes: Vec::new(),
            options: SchemaOptions::default(),
            references: BTreeSet::new(),
        }
    }

    fn fields(&mut self, entries: &[(String, Def)], pre: &Preprocessor<'_>) -> Result<()> {
        for (key, def) in entries {
            self.field(key, def, pre)?;
        }

        Ok(())
    }

    fn field(&mut self, key: &str, def: &Def, pre: &Preprocessor<'_>) -> Result<()> {
        // a trailing `?` on the key marks the field optional
        let (ident, key_required) = match key.strip_suffix('?') {
            Some(ident) => (ident, false),
            None => (key, true),
        };

        if let Def::Func(func) = def {
            return self.function(ident, func, def);
        }

        if let Some(spec) = index_declaration(ident, def) {
            self.indexes.push((ident.to_string(), spec));
            return Ok(());
        }

        let mut node = TypeNode::build(def, pre)?;
        node.required = node.required && key_required;

        if let NodeKind::Reference(reference) = &node.kind
            && reference.cardinality == Cardinality::Many
        {
            self.indexes
                .push((ident.to_string(), IndexSpec::many(ident, &reference.to)));
        }

        self.push(ident, FieldDef::Node(node), def)
    }

    // hook option, or a function kept verbatim as a literal field
    fn function(&mut self, ident: &str, func: &Func, def: &Def) -> Result<()> {
        match (ident, func) {
            ("validate", Func::Validate(f)) => self.options.validate = Some(f.clone()),
            ("parse", Func::Transform(f)) => self.options.parse = Some(f.clone()),
            ("serialize", Func::Transform(f)) => self.options.serialize = Some(f.clone()),
            ("format", Func::Transform(f)) => self.options.format = Some(f.clone()),
            (hook, _) if SchemaOptions::HOOKS.contains(&hook) => {
                return Err(Error::invalid_definition(
                    def,
                    format!("wrong function kind for hook '{hook}'"),
                ));
            }
            _ => return self.push(ident, FieldDef::Literal(func.clone()), def),
        }

        Ok(())
    }

    fn push(&mut self, ident: &str, field: FieldDef, def: &Def) -> Result<()> {
        if self.fields.iter().any(|f| f.ident == ident) {
            return Err(Error::invalid_definition(
                def,
                format!("duplicate field '{ident}'"),
            ));
        }
        self.fields.push(Field {
            ident: ident.to_string(),
            def: field,
        });

        Ok(())
    }

    // copy the listed fields from the parent schema, if it is already known
    fn project(&mut self, body: &Def, pre: &Preprocessor<'_>) -> Result<()> {
        let parent = self
            .metadata
            .parent
            .clone()
            .ok_or_else(|| Error::invalid_definition(body, "projection needs a schema"))?;
        let Some(Def::List(names)) = body.get("fields") else {
            return Err(Error::invalid_definition(body, "projection needs a fields list"));
        };

        self.references.insert(parent.clone());

        let Some(source) = pre.resolver().find_schema(&parent) else {
            return Ok(());
        };
        let Some(source_fields) = source.fields() else {
            return Err(Error::invalid_definition(
                body,
                format!("projection parent '{parent}' has no fields"),
            ));
        };

        for name in names {
            let ident = name
                .as_str()
                .ok_or_else(|| Error::invalid_definition(name, "field name must be a string"))?;
            let field = source_fields.get(ident).ok_or_else(|| {
                Error::invalid_definition(
                    body,
                    format!("'{parent}' has no field '{ident}' to project"),
                )
            })?;
            self.push(ident, field.def.clone(), name)?;
        }

        Ok(())
    }

    fn finish(self) -> Schema {
        let mut references = self.references;
        let mut relations = BTreeSet::new();

        for node in self.fields.iter().filter_map(Field::node) {
            references.extend(node.references.iter().cloned());
            relations.extend(node.relations.iter().cloned());
        }

        Schema {
            name: self.name,
            shape: Shape::Struct(FieldList {
                fields: self.fields,
            }),
            metadata: self.metadata,
            indexes: self.indexes,
            options: self.options,
            references,
            relations,
        }
    }

    fn finish_node(self, node: TypeNode) -> Schema {
        Schema {
            name: self.name,
            references: node.references.clone(),
            relations: node.relations.clone(),
            shape: Shape::Node(Box::new(node)),
            metadata: self.metadata,
            indexes: self.indexes,
            options: self.options,
        }
    }
}

// `{ unique: ['a', 'b'] }` under any key, or `primary: ['id']` directly
fn index_declaration(ident: &str, def: &Def) -> Option<IndexSpec> {
    if let Some(spec) = IndexSpec::from_def(def) {
        return Some(spec);
    }

    let kind = IndexKind::from_key(ident)?;
    let Def::List(items) = def else {
        return None;
    };
    let fields = items
        .iter()
        .map(|item| item.as_str().map(ToString::to_string))
        .collect::<Option<Vec<_>>>()?;

    Some(IndexSpec {
        kind,
        fields,
        target: None,
    })
}
