use crate::{
    config::LinkConfig,
    def::Def,
    error::Error,
    model::{Model, ModelSource},
    schema::Kind,
    value::Value,
};
use serde_json::json;

fn model(entities: &[(&str, serde_json::Value)]) -> Model {
    let source = entities
        .iter()
        .fold(ModelSource::new(), |source, (name, def)| {
            source.entity(*name, def.clone())
        });

    Model::new(source, &LinkConfig::default()).expect("model should compile")
}

//
// ordering
//

#[test]
fn dependencies_are_ordered_first() {
    let model = model(&[
        ("Company", json!({ "Entity": {}, "name": "string", "address": "Address" })),
        ("Address", json!({ "Entity": {}, "city": "string" })),
    ]);

    assert_eq!(model.order(), ["Address", "Company"]);
    assert!(model.warnings().is_empty());
}

#[test]
fn missing_entities_become_warnings() {
    let model = model(&[(
        "Company",
        json!({ "Entity": {}, "address": "Address" }),
    )]);

    assert_eq!(model.order(), ["Company"]);
    assert_eq!(
        model.warnings(),
        ["Warning: \"Address\" referenced by \"Company\" is not found"]
    );
}

#[test]
fn bootstrap_entity_is_seeded_first() {
    let model = model(&[
        ("Person", json!({ "name": "string", "id": "Identifier" })),
        ("Identifier", json!({ "Registry": {}, "value": "string" })),
    ]);

    assert_eq!(model.order(), ["Identifier", "Person"]);
}

#[test]
fn cycles_warn_once_per_back_edge() {
    let model = model(&[
        ("Author", json!({ "books": { "many": "Book" } })),
        ("Book", json!({ "author": "Author" })),
    ]);

    assert_eq!(model.order(), ["Book", "Author"]);
    assert_eq!(model.warnings(), ["Recursive dependency: Book.Author"]);
}

#[test]
fn self_references_are_skipped_silently() {
    let model = model(&[("Person", json!({ "name": "string", "parent": "?Person" }))]);

    assert_eq!(model.order(), ["Person"]);
    assert!(model.warnings().is_empty());
}

#[test]
fn internal_entities_are_resolvable_but_unordered() {
    let model = model(&[
        (".Audit", json!({ "at": "string", "missing": "Ghost" })),
        ("Person", json!({ "name": "string" })),
    ]);

    assert!(model.get(".Audit").is_some());
    assert_eq!(model.order(), ["Person"]);
    assert!(model.warnings().is_empty());
    assert_eq!(model.public_entities().count(), 1);
}

#[test]
fn internal_prefix_comes_from_the_config() {
    let source = ModelSource::new()
        .entity("_Audit", json!({ "missing": "Ghost" }))
        .entity(".Person", json!({ "name": "string" }));
    let config = LinkConfig {
        internal_prefix: "_".to_string(),
        ..LinkConfig::default()
    };
    let model = Model::new(source, &config).expect("model should compile");

    assert_eq!(model.order(), [".Person"]);
    assert!(model.warnings().is_empty());
}

#[test]
fn duplicate_entities_fail() {
    let source = ModelSource::new()
        .entity("Person", json!({ "name": "string" }))
        .entity("Person", json!({ "age": "number" }));

    assert!(matches!(
        Model::new(source, &LinkConfig::default()),
        Err(Error::DuplicateEntity(name)) if name == "Person"
    ));
}

//
// checks
//

#[test]
fn references_resolve_through_the_model() {
    let model = model(&[
        ("Company", json!({ "name": "string", "address": "Address" })),
        ("Address", json!({ "city": "string" })),
    ]);

    let result = model
        .check("Company", &Value::from(json!({ "name": "Acme", "address": { "city": 1 } })))
        .expect("known entity");
    assert_eq!(
        result.errors,
        ["Field \"address.city\" not of expected type: string"]
    );

    assert!(model.check("Nobody", &Value::Null).is_none());
}

#[test]
fn partial_checks_stop_at_references() {
    let model = model(&[
        ("Company", json!({ "name": "string", "address": "Address" })),
        ("Address", json!({ "city": "string" })),
    ]);

    let result = model
        .partial_check("Company", &Value::from(json!({ "address": {} })))
        .expect("known entity");

    assert_eq!(result.errors, ["Field \"address.city\" is required"]);
}

#[test]
fn plural_references_check_each_element() {
    let model = model(&[
        ("Team", json!({ "members": { "many": "Person" } })),
        ("Person", json!({ "name": "string" })),
    ]);

    let result = model
        .check("Team", &Value::from(json!({ "members": [{ "name": "a" }, { "name": 2 }] })))
        .expect("known entity");
    assert_eq!(
        result.errors,
        ["Field \"members[1].name\" not of expected type: string"]
    );
}

//
// projection
//

#[test]
fn projections_compile_after_their_parent() {
    let model = model(&[
        (
            "PublicAccount",
            json!({ "Projection": { "schema": "Account", "fields": ["login"] } }),
        ),
        (
            "Account",
            json!({ "Entity": {}, "login": "string", "password": "string" }),
        ),
    ]);

    assert_eq!(
        model.entity_names().collect::<Vec<_>>(),
        ["Account", "PublicAccount"]
    );

    let projection = model.get("PublicAccount").expect("projection compiled");
    assert_eq!(projection.kind(), Kind::Projection);
    assert_eq!(projection.metadata.parent.as_deref(), Some("Account"));
    assert_eq!(projection.fields().map(|f| f.len()), Some(1));
    assert_eq!(model.order(), ["Account", "PublicAccount"]);

    let result = model
        .check(
            "PublicAccount",
            &Value::from(json!({ "login": "ada", "password": "x" })),
        )
        .expect("known entity");
    assert_eq!(result.errors, ["Field \"password\" is not expected"]);
}

#[test]
fn projections_of_projections_compile_parent_first() {
    let model = model(&[
        (
            "Narrow",
            json!({ "Projection": { "schema": "Public", "fields": ["login"] } }),
        ),
        (
            "Public",
            json!({ "Projection": { "schema": "Account", "fields": ["login", "name"] } }),
        ),
        (
            "Account",
            json!({ "Entity": {}, "login": "string", "name": "string", "password": "string" }),
        ),
    ]);

    assert_eq!(
        model.entity_names().collect::<Vec<_>>(),
        ["Account", "Public", "Narrow"]
    );
    assert_eq!(model.get("Narrow").and_then(|s| s.fields()).map(|f| f.len()), Some(1));
    assert_eq!(model.order(), ["Account", "Public", "Narrow"]);
    assert!(model.warnings().is_empty());

    let result = model
        .check("Narrow", &Value::from(json!({ "login": "a" })))
        .expect("known entity");
    assert!(result.valid, "{:?}", result.errors);
}

#[test]
fn projection_cycles_are_reported() {
    let model = model(&[
        (
            "Left",
            json!({ "Projection": { "schema": "Right", "fields": [] } }),
        ),
        (
            "Right",
            json!({ "Projection": { "schema": "Left", "fields": [] } }),
        ),
    ]);

    assert_eq!(model.len(), 2);
    assert_eq!(model.warnings(), ["Recursive dependency: Right.Left"]);
}

#[test]
fn projection_of_missing_parent_warns() {
    let model = model(&[(
        "Shadow",
        json!({ "Projection": { "schema": "Ghost", "fields": ["name"] } }),
    )]);

    assert_eq!(model.get("Shadow").and_then(|s| s.fields()).map(|f| f.len()), Some(0));
    assert_eq!(
        model.warnings(),
        ["Warning: \"Ghost\" referenced by \"Shadow\" is not found"]
    );
}

#[test]
fn projecting_an_unknown_field_fails() {
    let source = ModelSource::new()
        .entity("Account", json!({ "login": "string" }))
        .entity(
            "Bad",
            json!({ "Projection": { "schema": "Account", "fields": ["email"] } }),
        );

    let err = Model::new(source, &LinkConfig::default()).expect_err("unknown field");
    assert!(err.is_invalid_definition());
}

//
// source entries
//

#[test]
fn entries_split_types_database_and_entities() {
    let entries = vec![
        (
            ".types".to_string(),
            Def::from(json!({ "datetime": { "base": "string", "metadata": { "pg": "timestamp" } } })),
        ),
        (".database".to_string(), Def::from(json!({ "name": "app" }))),
        (
            "Event".to_string(),
            Def::from(json!({ "Journal": {}, "at": "datetime" })),
        ),
    ];
    let source = ModelSource::from_entries(entries).expect("valid entries");
    let model = Model::new(source, &LinkConfig::default()).expect("model should compile");

    assert_eq!(model.len(), 1);
    assert!(model.types().contains("datetime"));
    assert_eq!(model.database(), Some(&Value::from(json!({ "name": "app" }))));
    assert!(model.warnings().is_empty());

    let event = model.get("Event").expect("compiled");
    assert_eq!(event.kind(), Kind::Journal);
    assert!(
        !model
            .check("Event", &Value::from(json!({ "at": 5 })))
            .is_some_and(|r| r.valid)
    );
}

#[test]
fn custom_types_are_unknown_without_the_registry() {
    let source = ModelSource::new().entity("Event", json!({ "at": "datetime" }));

    assert!(Model::new(source, &LinkConfig::default()).is_err());
}
