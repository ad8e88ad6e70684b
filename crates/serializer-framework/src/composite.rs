//! # Composite Fields
//!
//! List- and dict-shaped fields whose items are processed by a child
//! serializer. Each item is handled by the same child, so a composite child
//! re-resolves its delegate per item.

use std::any::Any;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::{ErrorDetail, FieldError, ValidationError};
use crate::field::{primitive_type_name, Field, FieldOptions};
use crate::fields::CharField;
use crate::native::Native;
use crate::serializer::Serializer;

fn item_errors(errors: IndexMap<String, ErrorDetail>) -> FieldError {
    ValidationError::from_detail(ErrorDetail::Dict(errors)).into()
}

/// A list of items validated by one child serializer.
#[derive(Clone, Debug)]
pub struct SerializerListField {
    options: FieldOptions,
    child: Arc<Serializer>,
    allow_empty: bool,
}

impl SerializerListField {
    pub fn new(child: Serializer) -> Self {
        Self {
            options: FieldOptions::default(),
            child: Arc::new(child),
            allow_empty: true,
        }
    }

    pub fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    pub fn child(&self) -> &Arc<Serializer> {
        &self.child
    }
}

impl Field for SerializerListField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_internal_value(&self, data: &Value, ctx: &mut Context) -> Result<Native, FieldError> {
        let Value::Array(items) = data else {
            return Err(ValidationError::new(
                format!(
                    "Expected a list of items but got type \"{}\".",
                    primitive_type_name(data)
                ),
                "not_a_list",
            )
            .into());
        };
        if items.is_empty() && !self.allow_empty {
            return Err(ValidationError::new("This list may not be empty.", "empty").into());
        }
        let mut values = Vec::with_capacity(items.len());
        let mut errors = IndexMap::new();
        for (index, item) in items.iter().enumerate() {
            match self.child.run_validation(Some(item), ctx) {
                Ok(value) => values.push(value),
                Err(FieldError::Validation(err)) => {
                    errors.insert(index.to_string(), err.into_detail());
                }
                Err(FieldError::Skip) => {}
                Err(err) => return Err(err),
            }
        }
        if !errors.is_empty() {
            return Err(item_errors(errors));
        }
        Ok(Native::List(values))
    }

    fn to_representation(&self, value: &Native, ctx: &mut Context) -> Result<Value, FieldError> {
        let items = match value {
            Native::List(items) => items,
            other => {
                return Err(ValidationError::new(
                    format!("Expected a list of items but got {}.", other.type_name()),
                    "not_a_list",
                )
                .into())
            }
        };
        items
            .iter()
            .map(|item| {
                if item.is_null() {
                    Ok(Value::Null)
                } else {
                    self.child.to_representation(item, ctx)
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

/// A dict of items validated by one child serializer.
///
/// Keys are validated by a key field before their values.
#[derive(Clone, Debug)]
pub struct SerializerDictField {
    options: FieldOptions,
    child: Arc<Serializer>,
    key_child: Arc<dyn Field>,
}

impl SerializerDictField {
    pub fn new(child: Serializer) -> Self {
        Self {
            options: FieldOptions::default(),
            child: Arc::new(child),
            key_child: Arc::new(CharField::new()),
        }
    }

    pub fn with_key_child(mut self, key_child: impl Field) -> Self {
        self.key_child = Arc::new(key_child);
        self
    }

    pub fn child(&self) -> &Arc<Serializer> {
        &self.child
    }

    pub fn key_child(&self) -> &Arc<dyn Field> {
        &self.key_child
    }
}

impl Field for SerializerDictField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_internal_value(&self, data: &Value, ctx: &mut Context) -> Result<Native, FieldError> {
        let Value::Object(object) = data else {
            return Err(ValidationError::new(
                format!(
                    "Expected a dictionary of items but got type \"{}\".",
                    primitive_type_name(data)
                ),
                "not_a_dict",
            )
            .into());
        };
        let mut values = IndexMap::new();
        let mut errors = IndexMap::new();
        for (key, item) in object {
            let key_value = Value::String(key.clone());
            let result = self
                .key_child
                .run_validation(Some(&key_value), ctx)
                .and_then(|_| self.child.run_validation(Some(item), ctx));
            match result {
                Ok(value) => {
                    values.insert(key.clone(), value);
                }
                Err(FieldError::Validation(err)) => {
                    errors.insert(key.clone(), err.into_detail());
                }
                Err(FieldError::Skip) => {}
                Err(err) => return Err(err),
            }
        }
        if !errors.is_empty() {
            return Err(item_errors(errors));
        }
        Ok(Native::Map(values))
    }

    fn to_representation(&self, value: &Native, ctx: &mut Context) -> Result<Value, FieldError> {
        let Some(entries) = value.entries() else {
            return Err(ValidationError::new(
                format!("Expected a dictionary of items but got {}.", value.type_name()),
                "not_a_dict",
            )
            .into());
        };
        let mut rendered = Map::new();
        for (key, item) in entries {
            let item = if item.is_null() {
                Value::Null
            } else {
                self.child.to_representation(item, ctx)?
            };
            rendered.insert(key.clone(), item);
        }
        Ok(Value::Object(rendered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldBuilder;
    use serde_json::json;

    fn child() -> Serializer {
        Serializer::builder("ExampleChildSerializer")
            .field("name", CharField::new())
            .build()
            .allow_null(true)
    }

    #[test]
    fn list_items_round_trip() {
        let field = SerializerListField::new(child()).allow_empty(false);
        let mut ctx = Context::new();
        let data = json!([{"name": "Foo Name"}, null]);
        let value = field.run_validation(Some(&data), &mut ctx).unwrap();
        assert_eq!(field.to_representation(&value, &mut ctx).unwrap(), data);
    }

    #[test]
    fn list_rejects_other_shapes_and_empty_lists() {
        let field = SerializerListField::new(child()).allow_empty(false);
        let mut ctx = Context::new();
        let err = field
            .run_validation(Some(&json!({"foo": {}})), &mut ctx)
            .unwrap_err();
        let err = err.validation().unwrap();
        assert_eq!(err.code(), Some("not_a_list"));
        assert!(err.detail().messages()[0]
            .message
            .to_lowercase()
            .contains("expected a list of items"));

        let err = field.run_validation(Some(&json!([])), &mut ctx).unwrap_err();
        assert!(err.validation().unwrap().detail().messages()[0]
            .message
            .contains("may not be empty"));
    }

    #[test]
    fn list_item_errors_are_keyed_by_index() {
        let field = SerializerListField::new(child());
        let err = field
            .run_validation(Some(&json!([{"name": "ok"}, {}])), &mut Context::new())
            .unwrap_err();
        assert_eq!(
            serde_json::to_value(err.validation().unwrap().detail()).unwrap(),
            json!({"1": {"name": ["This field is required."]}})
        );
    }

    #[test]
    fn dict_items_round_trip_and_reject_lists() {
        let field = SerializerDictField::new(child());
        let mut ctx = Context::new();
        let data = json!({"foo": {"name": "Foo Name"}, "bar": null});
        let value = field.run_validation(Some(&data), &mut ctx).unwrap();
        assert_eq!(field.to_representation(&value, &mut ctx).unwrap(), data);

        let err = field
            .run_validation(Some(&json!([{"name": "Foo Name"}])), &mut ctx)
            .unwrap_err();
        assert!(err.validation().unwrap().detail().messages()[0]
            .message
            .to_lowercase()
            .contains("expected a dictionary of items"));
    }
}
