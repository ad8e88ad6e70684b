use parameterized_serializers::resolver::{resource_items, Inflectors, ViewContext};
use parameterized_serializers::{lookup_serializer_parameters, ResolverSettings};
use serializer_framework::DataType;
use serializer_sample::model::{Article, Person};
use serializer_sample::serializers::example_person_serializer;
use serializer_sample::urls;
use serializer_sample::viewsets::ExampleViewSet;

fn parameters(settings: &ResolverSettings) -> Vec<String> {
    lookup_serializer_parameters(&urls::root(), settings)
        .specific_serializers
        .keys()
        .cloned()
        .collect()
}

#[test]
fn test_discovery_is_deterministic() {
    let settings = ResolverSettings::default();
    let first = parameters(&settings);
    assert_eq!(first, vec!["people", "types", "wo-models", "types-unhandled"]);
    assert_eq!(parameters(&settings), first);
}

#[test]
fn test_override_router_wins() {
    let maps = lookup_serializer_parameters(&urls::root(), &ResolverSettings::default());
    assert_eq!(
        maps.specific_serializers["people"].name(),
        "OverriddenPersonSerializer"
    );
    assert_eq!(
        maps.specific_serializers_by_type[&DataType::of::<Person>()].name(),
        "OverriddenPersonSerializer"
    );
    // The discovered maps carry no inverse index yet
    assert!(maps.parameters.is_empty());
}

#[test]
fn test_explicit_meta_parameter_is_not_inflected() {
    let maps = lookup_serializer_parameters(&urls::root(), &ResolverSettings::default());
    assert_eq!(
        maps.specific_serializers["types-unhandled"].name(),
        "ExampleUnhandledSerializer"
    );
    assert!(!maps.specific_serializers.contains_key("types-unhandleds"));
}

#[test]
fn test_inflection_chain() {
    let uninflected = ResolverSettings::default().with_inflectors(Inflectors::none());
    assert_eq!(
        parameters(&uninflected),
        vec!["people", "person", "types", "wo-model", "types-unhandled"]
    );

    let shouting = ResolverSettings::default()
        .with_inflectors(Inflectors::none().then(|word: &str| word.to_uppercase()));
    let shouted = parameters(&shouting);
    assert_eq!(shouted[0], "PEOPLE");
    assert!(shouted.contains(&"WO-MODEL".to_string()));
}

#[test]
fn test_settings_from_json() {
    let settings = ResolverSettings::from_json(r#"{"inflectors": ["pluralize"]}"#).unwrap();
    assert_eq!(
        parameters(&settings),
        vec!["people", "types", "wo-models", "types-unhandled"]
    );
    assert!(ResolverSettings::from_json(r#"{"inflectors": ["shout"]}"#).is_err());
    assert!(ResolverSettings::from_json(r#"{"url_parameter_pattern": "("}"#).is_err());
}

#[test]
fn test_queryset_model_is_preferred() {
    let settings = ResolverSettings::default();
    let detail = "^people/(?P<pk>[^/.]+)/$";

    let view = ExampleViewSet::new(example_person_serializer(), ViewContext::detached());
    let item = resource_items(&view, Some(detail), &settings);
    assert_eq!(item.data_type, Some(DataType::of::<Person>()));
    assert_eq!(item.parameter.as_deref(), Some("people"));

    let view = ExampleViewSet::new(example_person_serializer(), ViewContext::detached())
        .with_queryset(DataType::of::<Article>());
    let item = resource_items(&view, Some(detail), &settings);
    assert_eq!(item.data_type, Some(DataType::of::<Article>()));
    assert_eq!(item.parameter.as_deref(), Some("articles"));
    assert_eq!(
        item.serializer.map(|s| s.name().to_string()).as_deref(),
        Some("ExamplePersonSerializer")
    );
}
