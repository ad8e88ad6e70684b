//! # Parameterized Generic Serializer
//!
//! A composite serializer that processes its own (generic) fields, then
//! delegates the rest of the pass to the specific serializer selected by a
//! [`ParameterField`].
//!
//! The parameter can live in three places:
//!
//! - a field of the generic serializer itself:
//!   `{"type": "people", "id": 1, "name": "Alice"}`
//! - a sibling field in the parent serializer, named with
//!   [`GenericSerializerBuilder::parameter_field_name`]:
//!   `{"type": "people", "attributes": {"name": "Alice"}}`
//! - the key of a [`ParameterDictField`](crate::parameter::ParameterDictField):
//!   `{"people": {"name": "Alice"}}`
//!
//! With [`exclude_parameterized`](GenericSerializerBuilder::exclude_parameterized)
//! the specific serializer is still resolved, but only its fields the generic
//! serializer also declares are used.

use serializer_framework::{
    Composite, CompositeHooks, Context, DataType, Field, FieldError, Native, Serializer,
    SerializerBuilder, UnhandledOptions, ValidationError,
};
use tracing::{trace, warn};

use crate::parameter::{ParameterError, ParameterField, PARAMETER_FIELD};

/// Builder for a parameterized generic serializer.
pub struct GenericSerializerBuilder {
    inner: SerializerBuilder,
    parameter_field_name: Option<String>,
    exclude_parameterized: bool,
    primary: bool,
}

/// Entry point for building parameterized generic serializers.
pub struct GenericSerializer;

impl GenericSerializer {
    pub fn builder(name: &str) -> GenericSerializerBuilder {
        GenericSerializerBuilder {
            inner: Serializer::builder(name),
            parameter_field_name: None,
            exclude_parameterized: false,
            primary: true,
        }
    }
}

impl GenericSerializerBuilder {
    pub fn field(mut self, name: &str, field: impl Field) -> Self {
        self.inner = self.inner.field(name, field);
        self
    }

    pub fn model(mut self, model: DataType) -> Self {
        self.inner = self.inner.model(model);
        self
    }

    pub fn parameter(mut self, parameter: impl Into<String>) -> Self {
        self.inner = self.inner.parameter(parameter);
        self
    }

    pub fn unhandled(mut self, options: UnhandledOptions) -> Self {
        self.inner = self.inner.unhandled(options);
        self
    }

    /// Take the parameter from the sibling field of this name in the parent
    /// serializer.
    pub fn parameter_field_name(mut self, name: impl Into<String>) -> Self {
        self.parameter_field_name = Some(name.into());
        self
    }

    /// Only use the specific serializer's fields that this serializer declares.
    pub fn exclude_parameterized(mut self, exclude: bool) -> Self {
        self.exclude_parameterized = exclude;
        self
    }

    /// Whether the serializer chosen by the serving view overrides resolution
    /// when this serializer is the root of a pass. Defaults to true.
    pub fn primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    pub fn build(self) -> Serializer {
        let hooks = GenericHooks {
            parameter_field_name: self.parameter_field_name,
            exclude_parameterized: self.exclude_parameterized,
        };
        self.inner
            .composite(Composite::new(self.primary, hooks))
            .build()
    }
}

#[derive(Debug)]
struct GenericHooks {
    parameter_field_name: Option<String>,
    exclude_parameterized: bool,
}

impl CompositeHooks for GenericHooks {
    fn bind(&self, serializer: &Serializer, parent: &Serializer) {
        let Some(name) = &self.parameter_field_name else {
            return;
        };
        let sibling = parent
            .field(name)
            .and_then(|field| field.as_any().downcast_ref::<ParameterField>());
        match sibling {
            Some(parameter_field) => parameter_field.bind_to_composite(serializer),
            None => warn!(
                serializer = serializer.name(),
                parent = parent.name(),
                parameter_field = %name,
                "No sibling parameter field to bind to"
            ),
        }
    }

    fn before_representation(
        &self,
        serializer: &Serializer,
        instance: &Native,
        ctx: &mut Context,
    ) -> Result<(), FieldError> {
        let Some(parameter_field) = serializer.clone_meta().get::<ParameterField>(PARAMETER_FIELD)
        else {
            return Ok(());
        };
        let field_name = parameter_field.options().field_name().to_string();
        match parameter_field.get_attribute(instance, ctx) {
            Ok(_) | Err(FieldError::Skip) => Ok(()),
            Err(FieldError::Missing(_) | FieldError::Attribute(_)) => {
                let err = ValidationError::from(ParameterError::instance(instance));
                Err(err.nested(field_name).into())
            }
            Err(FieldError::Validation(err)) => Err(err.nested(field_name).into()),
        }
    }

    fn prepare_child(&self, serializer: &Serializer, child: &mut Serializer) {
        if !self.exclude_parameterized {
            return;
        }
        let keep = serializer.field_source_attrs();
        child.retain_fields(|name| keep.contains(name));
        trace!(
            serializer = serializer.name(),
            child = child.name(),
            kept = child.fields().len(),
            "Excluded parameterized fields"
        );
    }
}
