//! # Unhandled Values
//!
//! A serializer configured with [`UnhandledOptions`] does not drop input keys
//! that none of its fields consumed. They are validated by a child field and
//! collected into the configured `source` (the whole validated value for `*`),
//! and rendered back alongside the field values on output.
//!
//! Unhandled values must never shadow field values. A collision fails the pass
//! with an [`UnhandledConflict`] in either direction.

use std::any::Any;
use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::context::Context;
use crate::error::{ErrorDetail, FieldError, ValidationError, NON_FIELD_ERRORS};
use crate::field::{primitive_type_name, Field, FieldBuilder, FieldOptions};
use crate::fields::UnvalidatedField;
use crate::native::{set_value, Native};
use crate::serializer::Serializer;

/// Configuration of unhandled value capture.
#[derive(Clone, Debug)]
pub struct UnhandledOptions {
    source: String,
    child: Arc<dyn Field>,
}

impl Default for UnhandledOptions {
    fn default() -> Self {
        Self {
            source: "*".to_string(),
            child: Arc::new(UnvalidatedField::new()),
        }
    }
}

impl UnhandledOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where unhandled values are collected, `*` for the validated value itself.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Field used to validate and render each unhandled value.
    pub fn child(mut self, child: impl Field) -> Self {
        self.child = Arc::new(child);
        self
    }
}

/// Unhandled values collide with field values.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Unhandled values conflict with field values: {conflicts:?}")]
pub struct UnhandledConflict {
    pub conflicts: BTreeSet<String>,
}

impl From<UnhandledConflict> for ValidationError {
    fn from(conflict: UnhandledConflict) -> Self {
        ValidationError::new(conflict.to_string(), "conflicts").nested(NON_FIELD_ERRORS)
    }
}

impl From<UnhandledConflict> for FieldError {
    fn from(conflict: UnhandledConflict) -> Self {
        FieldError::Validation(conflict.into())
    }
}

fn check_conflicts<'a>(
    unhandled: impl Iterator<Item = &'a String>,
    handled: impl Fn(&str) -> bool,
) -> Result<(), UnhandledConflict> {
    let conflicts: BTreeSet<String> = unhandled.filter(|key| handled(key)).cloned().collect();
    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(UnhandledConflict { conflicts })
    }
}

/// The dict-shaped field holding the unhandled values of one serializer.
#[derive(Debug)]
pub struct UnhandledChild {
    options: FieldOptions,
    child: Arc<dyn Field>,
}

impl UnhandledChild {
    pub(crate) fn new(options: UnhandledOptions, parent: &str) -> Self {
        let mut field = Self {
            options: FieldOptions::default(),
            child: options.child,
        }
        .source(options.source)
        .required(false);
        field.options.bind("", parent);
        field
    }

    /// Validates the input keys no field of `serializer` consumed and stores
    /// them into `values`.
    pub fn collect(
        &self,
        serializer: &Serializer,
        data: &Map<String, Value>,
        values: &mut IndexMap<String, Native>,
        ctx: &mut Context,
    ) -> Result<(), FieldError> {
        let unhandled: Map<String, Value> = data
            .iter()
            .filter(|(key, _)| !serializer.fields().contains_key(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let value = self.run_validation(Some(&Value::Object(unhandled)), ctx)?;
        if let Some(entries) = value.entries() {
            check_conflicts(entries.keys(), |key| values.contains_key(key))?;
            debug!(serializer = serializer.name(), count = entries.len(), "collected unhandled values");
        }
        set_value(values, &self.options.source_attrs(), value);
        Ok(())
    }

    /// Renders the unhandled values of `instance` into `data`.
    pub fn represent(
        &self,
        serializer: &Serializer,
        instance: &Native,
        data: &mut Map<String, Value>,
        ctx: &mut Context,
    ) -> Result<(), FieldError> {
        let attribute = match self.get_attribute(instance, ctx) {
            Ok(attribute) => attribute,
            Err(FieldError::Skip) => return Ok(()),
            Err(err) => return Err(err),
        };
        let attribute = if self.options.source() == "*" {
            // The whole instance: leave out what the fields already consumed.
            let consumed = serializer.field_source_attrs();
            let remaining = attribute
                .entries()
                .into_iter()
                .flatten()
                .filter(|(key, _)| !consumed.contains(*key) && !serializer.fields().contains_key(*key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            Native::Map(remaining)
        } else {
            attribute
        };
        let Value::Object(rendered) = self.to_representation(&attribute, ctx)? else {
            return Ok(());
        };
        check_conflicts(rendered.keys(), |key| data.contains_key(key))?;
        data.extend(rendered);
        Ok(())
    }
}

impl Field for UnhandledChild {
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
        for (key, value) in object {
            match self.child.run_validation(Some(value), ctx) {
                Ok(native) => {
                    values.insert(key.clone(), native);
                }
                Err(FieldError::Validation(err)) => {
                    errors.insert(key.clone(), err.into_detail());
                }
                Err(FieldError::Skip) => {}
                Err(err) => return Err(err),
            }
        }
        if !errors.is_empty() {
            return Err(ValidationError::from_detail(ErrorDetail::Dict(errors)).into());
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
    use crate::fields::CharField;
    use serde_json::json;

    fn unhandled_serializer() -> Serializer {
        Serializer::builder("ExampleUnhandledSerializer")
            .field("foo", CharField::new().source("qux").required(false))
            .unhandled(UnhandledOptions::new().source("unhandled"))
            .build()
    }

    #[test]
    fn unhandled_values_are_captured_and_rendered_back() {
        let serializer = unhandled_serializer();
        let data = json!({"qux": "qux"});
        let validated = serializer.validate(&data).unwrap();
        assert_eq!(validated.to_value(), json!({"unhandled": {"qux": "qux"}}));
        assert_eq!(serializer.represent(&validated).unwrap(), data);
    }

    #[test]
    fn conflicts_fail_validation() {
        let err = unhandled_serializer()
            .validate(&json!({"foo": "foo", "qux": "qux"}))
            .unwrap_err();
        let messages = err.detail().get(NON_FIELD_ERRORS).unwrap().messages();
        assert_eq!(messages[0].code, "conflicts");
        assert!(messages[0].message.to_lowercase().contains("conflict"));
    }

    #[test]
    fn conflicts_fail_representation() {
        let instance = Native::from(json!({"qux": "foo", "unhandled": {"foo": "qux"}}));
        let err = unhandled_serializer().represent(&instance).unwrap_err();
        let err = err.validation().unwrap();
        assert_eq!(err.code(), Some("conflicts"));
        assert!(err.detail().get(NON_FIELD_ERRORS).is_some());
    }

    #[test]
    fn missing_unhandled_attribute_is_skipped() {
        let instance = Native::from(json!({"qux": "foo"}));
        assert_eq!(
            unhandled_serializer().represent(&instance).unwrap(),
            json!({"foo": "foo"})
        );
    }

    #[test]
    fn star_source_merges_into_the_validated_value() {
        let serializer = Serializer::builder("Open")
            .field("name", CharField::new())
            .unhandled(UnhandledOptions::new())
            .build();
        let validated = serializer
            .validate(&json!({"name": "Alice", "extra": 1}))
            .unwrap();
        assert_eq!(validated.to_value(), json!({"name": "Alice", "extra": 1}));
        assert_eq!(
            serializer.represent(&validated).unwrap(),
            json!({"name": "Alice", "extra": 1})
        );
    }
}
