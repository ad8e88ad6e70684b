use std::sync::Arc;
use std::thread;

use parameterized_serializers::{GenericSerializer, ParameterField};
use serde_json::{json, Value};
use serializer_framework::{CharField, Context, FieldBuilder, FieldError, Native, Serializer};
use serializer_sample::model::{Article, Person};
use serializer_sample::serializers::{
    example_discovered_type_serializer, example_excluding_serializer,
    example_parameter_dict_serializer, example_person_serializer, example_sibling_serializer,
    example_type_field_serializer, overridden_person_serializer,
};
use serializer_sample::urls;

// --- Helpers ---

fn validated_by(value: &Native) -> &str {
    match value {
        Native::Validated(validated) => validated.serializer().name(),
        other => panic!("expected validated data, got {other:?}"),
    }
}

fn error_code(err: &FieldError, field: &str) -> String {
    let detail = err
        .validation()
        .and_then(|err| err.detail().get(field))
        .unwrap_or_else(|| panic!("no error for {field:?} in {err:?}"));
    detail.messages()[0].code.clone()
}

fn article() -> Native {
    Article {
        id: 3,
        title: "Intro".to_string(),
        author: 1,
    }
    .to_native()
    .unwrap()
}

// --- Explicit registrations ---

#[test]
fn test_type_field_round_trip() {
    let parent = example_type_field_serializer().unwrap();
    let data = json!({"type": "foo-type", "name": "Foo Name"});

    let validated = parent.validate(&data).unwrap();
    assert_eq!(validated.to_value(), json!({"name": "Foo Name"}));
    assert_eq!(validated_by(&validated), "ExampleChildSerializer");
    assert_eq!(parent.represent(&validated).unwrap(), data);
}

#[test]
fn test_type_field_without_fields() {
    let parent = example_type_field_serializer().unwrap();
    let validated = parent.validate(&json!({"type": "wo-models"})).unwrap();
    assert_eq!(validated.to_value(), json!({}));
    assert_eq!(parent.represent(&validated).unwrap(), json!({"type": "wo-models"}));
}

#[test]
fn test_type_field_child_errors() {
    let parent = example_type_field_serializer().unwrap();
    let err = parent.validate(&json!({"type": "foo-type"})).unwrap_err();
    assert_eq!(err.detail().get("name").unwrap().code(), Some("required"));
}

// --- Discovered serializers ---

#[test]
fn test_discovered_round_trip() {
    let parent = example_discovered_type_serializer().unwrap();
    let data = json!({"type": "people", "id": 1, "name": "Alice"});

    let validated = parent.validate(&data).unwrap();
    assert_eq!(validated.to_value(), json!({"id": 1, "name": "Alice"}));
    assert_eq!(validated_by(&validated), "OverriddenPersonSerializer");
    assert_eq!(parent.represent(&validated).unwrap(), data);
}

#[test]
fn test_parameter_inferred_from_model() {
    let parent = example_discovered_type_serializer().unwrap();
    let alice = Person::new(1, "Alice").to_native().unwrap();
    assert_eq!(
        parent.represent(&alice).unwrap(),
        json!({"type": "people", "id": 1, "name": "Alice"})
    );
}

#[test]
fn test_unknown_parameter() {
    let parent = example_discovered_type_serializer().unwrap();
    let err = parent
        .validate(&json!({"type": "robots", "name": "R2"}))
        .unwrap_err();
    let message = &err.detail().get("type").unwrap().messages()[0];
    assert_eq!(message.code, "unknown");
    assert!(message.message.contains("robots"));
}

#[test]
fn test_missing_parameter() {
    let parent = example_discovered_type_serializer().unwrap();
    let err = parent.validate(&json!({"name": "Alice"})).unwrap_err();
    assert_eq!(err.detail().get("type").unwrap().code(), Some("required"));
}

#[test]
fn test_unregistered_instance() {
    let parent = example_discovered_type_serializer().unwrap();
    let err = parent.represent(&article()).unwrap_err();
    assert_eq!(error_code(&err, "type"), "instance");
}

#[test]
fn test_unhandled_values_through_generic() {
    let parent = example_discovered_type_serializer().unwrap();
    let data = json!({"type": "types-unhandled", "foo": "bar"});

    let validated = parent.validate(&data).unwrap();
    assert_eq!(validated_by(&validated), "ExampleUnhandledSerializer");
    assert_eq!(
        validated.to_value(),
        json!({"type": "types-unhandled", "unhandled": {"foo": "bar"}})
    );
    assert_eq!(parent.represent(&validated).unwrap(), data);
}

// --- View-supplied serializers ---

#[test]
fn test_view_serializer_wins() {
    let parent = example_discovered_type_serializer().unwrap();
    let view = Arc::new(overridden_person_serializer());
    let mut ctx = Context::with_view_serializer(Arc::clone(&view));

    let validated = parent
        .validate_with(&json!({"type": "people", "name": "Bob"}), &mut ctx)
        .unwrap();
    assert_eq!(validated.to_value(), json!({"name": "Bob"}));
    assert_eq!(validated_by(&validated), "OverriddenPersonSerializer");
}

#[test]
fn test_view_serializer_mismatch() {
    let parent = example_discovered_type_serializer().unwrap();
    let mut ctx = Context::with_view_serializer(Arc::new(overridden_person_serializer()));
    let err = parent
        .validate_with(&json!({"type": "wo-models"}), &mut ctx)
        .unwrap_err();
    assert_eq!(err.detail().get("type").unwrap().code(), Some("mismatch"));
}

#[test]
fn test_view_serializer_not_registered() {
    // Shadowed by the override router, so it has no parameter
    let parent = example_discovered_type_serializer().unwrap();
    let mut ctx = Context::with_view_serializer(Arc::new(example_person_serializer()));
    let err = parent
        .validate_with(&json!({"type": "people", "name": "Bob"}), &mut ctx)
        .unwrap_err();
    assert_eq!(err.detail().get("type").unwrap().code(), Some("serializer"));
}

#[test]
fn test_generic_as_its_own_view_serializer() {
    let parent = Arc::new(example_discovered_type_serializer().unwrap());
    let mut ctx = Context::with_view_serializer(Arc::clone(&parent));
    let validated = parent
        .validate_with(&json!({"type": "people", "name": "Bob"}), &mut ctx)
        .unwrap();
    assert_eq!(validated_by(&validated), "OverriddenPersonSerializer");
}

// --- Placement of the parameter ---

#[test]
fn test_sibling_parameter_field() {
    let parent = example_sibling_serializer().unwrap();
    let data = json!({"type": "people", "attributes": {"id": 2, "name": "Bob"}});

    let validated = parent.validate(&data).unwrap();
    assert_eq!(validated.to_value(), data);
    assert_eq!(parent.represent(&validated).unwrap(), data);
}

#[test]
fn test_parameter_dict_field() {
    let parent = example_parameter_dict_serializer().unwrap();
    let data = json!({"resources": {
        "people": {"id": 1, "name": "Alice"},
        "wo-models": {},
    }});

    let validated = parent.validate(&data).unwrap();
    assert_eq!(parent.represent(&validated).unwrap(), data);

    let err = parent
        .validate(&json!({"resources": {"robots": {}}}))
        .unwrap_err();
    let detail = err.detail().get("resources").unwrap();
    assert_eq!(detail.get("robots").unwrap().code(), Some("unknown"));
}

// --- Options ---

#[test]
fn test_exclude_parameterized_fields() {
    let parent = example_excluding_serializer().unwrap();
    let validated = parent
        .validate(&json!({"type": "people", "id": 7, "name": "Alice"}))
        .unwrap();
    assert_eq!(validated.to_value(), json!({"name": "Alice"}));
    assert_eq!(
        parent.represent(&validated).unwrap(),
        json!({"type": "people", "name": "Alice"})
    );
}

#[test]
fn test_optional_parameter_is_skipped() {
    let type_field = ParameterField::builder()
        .urlconf(urls::root)
        .build()
        .unwrap()
        .required(false);
    let parent = GenericSerializer::builder("OptionalTypeSerializer")
        .field("type", type_field)
        .field("title", CharField::new())
        .build();

    assert_eq!(parent.represent(&article()).unwrap(), json!({"title": "Intro"}));
}

#[test]
fn test_default_parameter() {
    let type_field = ParameterField::builder()
        .urlconf(urls::root)
        .build()
        .unwrap()
        .default_value("people");
    let parent = GenericSerializer::builder("DefaultTypeSerializer")
        .field("type", type_field)
        .build();

    let validated = parent.validate(&json!({"name": "Carol"})).unwrap();
    assert_eq!(validated_by(&validated), "OverriddenPersonSerializer");
}

#[test]
fn test_explicit_registration_overrides_discovery() {
    let child = Serializer::builder("RobotSerializer")
        .field("name", CharField::new())
        .build();
    let type_field = ParameterField::builder()
        .urlconf(urls::root)
        .register("people", child)
        .build()
        .unwrap();
    let parent = GenericSerializer::builder("OverridingTypeSerializer")
        .field("type", type_field)
        .build();

    let validated = parent
        .validate(&json!({"type": "people", "name": "R2"}))
        .unwrap();
    assert_eq!(validated_by(&validated), "RobotSerializer");
    assert_eq!(
        parent.represent(&validated).unwrap(),
        json!({"type": "people", "name": "R2"})
    );
}

// --- Sharing ---

#[test]
fn test_concurrent_passes() {
    let parent = example_discovered_type_serializer().unwrap();
    let payloads = [
        json!({"type": "people", "id": 1, "name": "Alice"}),
        json!({"type": "wo-models"}),
        json!({"type": "types-unhandled", "foo": "bar"}),
    ];

    let rendered: Vec<Value> = thread::scope(|scope| {
        let handles: Vec<_> = payloads
            .iter()
            .map(|data| {
                let parent = &parent;
                scope.spawn(move || {
                    let validated = parent.validate(data).unwrap();
                    parent.represent(&validated).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(rendered, payloads);
}
