use std::any::Any;

use serde_json::Value;
use serializer_framework::{
    Context, Field, FieldBuilder, FieldError, FieldOptions, Native, Serializer,
    SerializerDictField,
};

use super::error::MissingSerializerSource;
use super::field::{ParameterField, ParameterFieldBuilder};

/// A dict of items whose keys are parameters.
///
/// Each key selects the specific serializer its value is processed with:
/// `{"people": {"name": "Alice"}, "types": {...}}`.
#[derive(Clone, Debug)]
pub struct ParameterDictField {
    inner: SerializerDictField,
    key: ParameterField,
}

impl ParameterDictField {
    /// `child` is the composite each value is processed with. The key field
    /// always retains the parameter.
    pub fn new(child: Serializer, key: ParameterFieldBuilder) -> Result<Self, MissingSerializerSource> {
        let key = key
            .skip(false)
            .build()?
            .label("Dict Item Key Parameter")
            .help_text("the key for an individual item in the dictionary to be used as the parameter");
        Ok(Self {
            inner: SerializerDictField::new(child).with_key_child(key.clone()),
            key,
        })
    }

    pub fn key(&self) -> &ParameterField {
        &self.key
    }
}

impl Field for ParameterDictField {
    fn options(&self) -> &FieldOptions {
        self.inner.options()
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        self.inner.options_mut()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    /// Binds the key to the item serializer rather than to the parent.
    fn bind(&self, _parent: &Serializer) {
        self.key.bind_to_composite(self.inner.child());
    }

    fn to_internal_value(&self, data: &Value, ctx: &mut Context) -> Result<Native, FieldError> {
        self.inner.to_internal_value(data, ctx)
    }

    fn to_representation(&self, value: &Native, ctx: &mut Context) -> Result<Value, FieldError> {
        self.inner.to_representation(value, ctx)
    }
}
