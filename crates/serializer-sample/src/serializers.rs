//! # Sample Serializers
//!
//! Specific serializers served by the sample views, and generic serializers
//! that dispatch to them.
//!
//! | Serializer | Kind | Parameter source |
//! |---|---|---|
//! | [`example_person_serializer`] | specific, `Person` model | `^people/$` route |
//! | [`overridden_person_serializer`] | specific, `Person` model | override router |
//! | [`example_type_field_serializer`] | generic | explicit registrations |
//! | [`example_discovered_type_serializer`] | generic | routing table |
//! | [`example_sibling_serializer`] | generic in a sibling field | routing table |
//! | [`example_parameter_dict_serializer`] | dict keyed by parameter | routing table |

use parameterized_serializers::parameter::MissingSerializerSource;
use parameterized_serializers::{GenericSerializer, ParameterDictField, ParameterField};
use serializer_framework::{
    CharField, DataType, FieldBuilder, IntegerField, Serializer, UnhandledOptions,
};

use crate::model::Person;
use crate::urls;

/// A simple serializer used as the child of generic serializers.
pub fn example_child_serializer() -> Serializer {
    Serializer::builder("ExampleChildSerializer")
        .field("name", CharField::new())
        .build()
}

fn person_serializer(name: &str) -> Serializer {
    Serializer::builder(name)
        .model(DataType::of::<Person>())
        .field("id", IntegerField::new().required(false))
        .field("name", CharField::new())
        .build()
}

pub fn example_person_serializer() -> Serializer {
    person_serializer("ExamplePersonSerializer")
}

/// Served by a view that overrides the `people` view.
pub fn overridden_person_serializer() -> Serializer {
    person_serializer("OverriddenPersonSerializer")
}

/// A serializer without a model or fields.
pub fn example_serializer_wo_model() -> Serializer {
    Serializer::builder("ExampleSerializerWOModel").build()
}

/// Keeps input keys it has no field for under `unhandled`.
pub fn example_unhandled_serializer() -> Serializer {
    Serializer::builder("ExampleUnhandledSerializer")
        .parameter("types-unhandled")
        .field("type", CharField::new().default_value("unhandled"))
        .unhandled(UnhandledOptions::new().source("unhandled"))
        .build()
}

/// A generic serializer whose `type` selects from explicit registrations.
pub fn example_type_field_serializer() -> Result<Serializer, MissingSerializerSource> {
    let type_field = ParameterField::builder()
        .register("foo-type", example_child_serializer())
        .register("wo-models", Serializer::empty())
        .build()?;
    Ok(GenericSerializer::builder("ExampleTypeFieldSerializer")
        .field("type", type_field)
        .build())
}

/// A generic serializer whose `type` selects from every view of the sample
/// routing table.
pub fn example_discovered_type_serializer() -> Result<Serializer, MissingSerializerSource> {
    let type_field = ParameterField::builder().urlconf(urls::root).build()?;
    Ok(GenericSerializer::builder("ExampleDiscoveredTypeSerializer")
        .field("type", type_field)
        .build())
}

/// Like [`example_discovered_type_serializer`], but only the `name` of the
/// specific serializer is used.
pub fn example_excluding_serializer() -> Result<Serializer, MissingSerializerSource> {
    let type_field = ParameterField::builder().urlconf(urls::root).build()?;
    Ok(GenericSerializer::builder("ExampleExcludingSerializer")
        .field("type", type_field)
        .field("name", CharField::new())
        .exclude_parameterized(true)
        .build())
}

/// The parameter and the parameterized data side by side:
/// `{"type": "people", "attributes": {"name": "Alice"}}`.
pub fn example_sibling_serializer() -> Result<Serializer, MissingSerializerSource> {
    let type_field = ParameterField::builder()
        .urlconf(urls::root)
        .skip(false)
        .build()?;
    let attributes = GenericSerializer::builder("ExampleAttributesSerializer")
        .parameter_field_name("type")
        .primary(false)
        .build();
    Ok(Serializer::builder("ExampleSiblingSerializer")
        .field("type", type_field)
        .field("attributes", attributes)
        .build())
}

/// Resources keyed by their parameter: `{"resources": {"people": {...}}}`.
pub fn example_parameter_dict_serializer() -> Result<Serializer, MissingSerializerSource> {
    let item = GenericSerializer::builder("ExampleDictItemSerializer")
        .primary(false)
        .build();
    let resources = ParameterDictField::new(item, ParameterField::builder().urlconf(urls::root))?;
    Ok(Serializer::builder("ExampleParameterDictSerializer")
        .field("resources", resources)
        .build())
}
