//! End-to-end: definitions in, linked model out, values checked against it.

use serde_json::json;
use typegraph::{prelude::*, types::ScalarBase};

fn source() -> ModelSource {
    ModelSource::new()
        .with_types(TypeRegistry::with_custom([
            TypeDescriptor::new("email", ScalarBase::String),
        ]))
        .entity(
            "Company",
            json!({
                "Entity": { "scope": "global" },
                "name": { "type": "string", "length": { "min": 2, "max": 40 } },
                "address": "Address",
                "staff": { "many": "Person" },
                "tags?": { "set": "string" },
                "byName": { "unique": ["name"] },
            }),
        )
        .entity(
            "Person",
            json!({
                "Entity": {},
                "name": "string",
                "contact": "email",
                "role": { "enum": ["owner", "member"] },
                "position?": ["number", "number"],
            }),
        )
        .entity("Address", json!({ "Details": {}, "city": "string", "zip": "?string" }))
}

#[test]
fn model_links_and_orders_entities() {
    let model = Model::new(source(), &LinkConfig::default()).expect("model should compile");

    assert!(model.warnings().is_empty(), "{:?}", model.warnings());

    let order = model.order();
    let pos = |name: &str| order.iter().position(|n| n == name).expect("ordered");
    assert!(pos("Address") < pos("Company"));
    assert!(pos("Person") < pos("Company"));
    assert_eq!(order.len(), 3);
}

#[test]
fn valid_documents_pass() {
    let model = Model::new(source(), &LinkConfig::default()).expect("model should compile");

    let company = Value::from(json!({
        "name": "Acme",
        "address": { "city": "Lviv" },
        "staff": [
            { "name": "Ada", "contact": "ada@acme.test", "role": "owner", "position": [1, 2] },
            { "name": "Bob", "contact": "bob@acme.test", "role": "member" },
        ],
    }));

    let result = model.check("Company", &company).expect("known entity");
    assert!(result.valid, "{:?}", result.errors);
    assert!(result.errors.is_empty());
}

#[test]
fn invalid_documents_report_every_field() {
    let model = Model::new(source(), &LinkConfig::default()).expect("model should compile");

    let company = Value::from(json!({
        "name": "A",
        "address": { "city": "Lviv", "country": "UA" },
        "staff": [
            { "name": "Ada", "contact": 7, "role": "boss" },
            { "name": "Bob", "contact": "b", "role": "member", "position": [1, 2, 3] },
        ],
        "founded": 1999,
    }));

    let result = model.check("Company", &company).expect("known entity");
    assert!(!result.valid);
    assert_eq!(
        result.errors,
        [
            "Field \"name\" length (1) is lower than minimum of 2",
            "Field \"address.country\" is not expected",
            "Field \"staff[0].contact\" not of expected type: email",
            "Field \"staff[0].role\" value \"boss\" is not in the allowed values: owner, member",
            "Field \"staff[1].position\" value length is more then expected in tuple",
            "Field \"founded\" is not expected",
        ]
    );
}

#[test]
fn plural_reference_against_a_scalar() {
    let model = Model::new(source(), &LinkConfig::default()).expect("model should compile");

    let result = model
        .partial_check("Company", &Value::from(json!({ "staff": "everyone" })))
        .expect("known entity");

    assert_eq!(
        result.errors,
        ["Field \"staff\" not of expected type: array, got: string"]
    );
}

#[test]
fn patches_may_omit_and_null_fields() {
    let model = Model::new(source(), &LinkConfig::default()).expect("model should compile");
    let patch = Value::from(json!({ "name": "Initech", "tags": null }));

    assert!(!model.check("Company", &patch).expect("known entity").valid);
    assert!(model.partial_check("Company", &patch).expect("known entity").valid);
}

#[test]
fn metadata_and_indexes_survive_linking() {
    let model = Model::new(source(), &LinkConfig::default()).expect("model should compile");
    let company = model.get("Company").expect("compiled");

    assert_eq!(company.kind(), Kind::Entity);
    assert_eq!(company.metadata.scope.to_string(), "global");
    assert!(company.index("byName").is_some_and(|spec| spec.is_unique()));
    assert!(company.index("staff").is_some());
    assert!(company.references.contains("Person"));
}

#[test]
fn namespaces_resolve_across_models() {
    let people = Model::new(
        ModelSource::new().entity("Person", json!({ "name": "string" })),
        &LinkConfig::default(),
    )
    .expect("people model");
    let teams = Model::new(
        ModelSource::new().entity("Team", json!({ "lead": "Person" })),
        &LinkConfig {
            log_warnings: false,
            ..LinkConfig::default()
        },
    )
    .expect("teams model");

    assert_eq!(
        teams.warnings(),
        ["Warning: \"Person\" referenced by \"Team\" is not found"]
    );

    let team = teams.get("Team").expect("compiled");
    let value = Value::from(json!({ "lead": { "name": 1 } }));

    assert_eq!(
        team.check_with(&value, &teams).errors,
        ["Field \"lead\" references unknown schema: Person"]
    );

    let mut namespaces = Namespaces::new().with(&teams);
    namespaces.attach(&people);
    assert!(team.check_consistency(&namespaces).is_empty());
    assert_eq!(
        team.check_with(&value, &namespaces).errors,
        ["Field \"lead.name\" not of expected type: string"]
    );

    assert!(namespaces.detach(&people));
    assert_eq!(team.check_consistency(&namespaces).len(), 1);
}

#[test]
fn config_loads_from_toml() {
    let config = LinkConfig::from_toml_str("bootstrap_entity = \"Address\"").expect("valid toml");
    let model = Model::new(source(), &config).expect("model should compile");

    assert_eq!(model.order().first().map(String::as_str), Some("Address"));
}
