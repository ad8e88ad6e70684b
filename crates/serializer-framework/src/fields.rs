//! Scalar field kinds.

use std::any::Any;

use serde_json::Value;

use crate::context::Context;
use crate::error::{FieldError, ValidationError};
use crate::field::{Field, FieldOptions};
use crate::native::Native;

/// Passes values through untouched.
#[derive(Clone, Debug, Default)]
pub struct UnvalidatedField {
    options: FieldOptions,
}

impl UnvalidatedField {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Field for UnvalidatedField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_internal_value(&self, data: &Value, _ctx: &mut Context) -> Result<Native, FieldError> {
        Ok(Native::from(data.clone()))
    }

    fn to_representation(&self, value: &Native, _ctx: &mut Context) -> Result<Value, FieldError> {
        Ok(value.to_value())
    }
}

#[derive(Clone, Debug, Default)]
pub struct CharField {
    options: FieldOptions,
    allow_blank: bool,
}

impl CharField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_blank(mut self, allow_blank: bool) -> Self {
        self.allow_blank = allow_blank;
        self
    }
}

impl Field for CharField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_internal_value(&self, data: &Value, _ctx: &mut Context) -> Result<Native, FieldError> {
        let text = match data {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            _ => return Err(ValidationError::new("Not a valid string.", "invalid").into()),
        };
        if text.trim().is_empty() && !self.allow_blank {
            return Err(ValidationError::new("This field may not be blank.", "blank").into());
        }
        Ok(Native::from(text))
    }

    fn to_representation(&self, value: &Native, _ctx: &mut Context) -> Result<Value, FieldError> {
        Ok(match value.to_value() {
            Value::String(text) => Value::String(text),
            other => Value::String(other.to_string()),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct IntegerField {
    options: FieldOptions,
}

impl IntegerField {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Field for IntegerField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_internal_value(&self, data: &Value, _ctx: &mut Context) -> Result<Native, FieldError> {
        let parsed = match data {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed
            .map(Native::from)
            .ok_or_else(|| ValidationError::new("A valid integer is required.", "invalid").into())
    }

    fn to_representation(&self, value: &Native, _ctx: &mut Context) -> Result<Value, FieldError> {
        match value.to_value() {
            Value::Number(number) => Ok(Value::Number(number)),
            other => Err(ValidationError::new(
                format!("A valid integer is required, got {other}."),
                "invalid",
            )
            .into()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct BooleanField {
    options: FieldOptions,
}

impl BooleanField {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Field for BooleanField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_internal_value(&self, data: &Value, _ctx: &mut Context) -> Result<Native, FieldError> {
        let parsed = match data {
            Value::Bool(flag) => Some(*flag),
            Value::String(text) => match text.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            },
            Value::Number(number) => match number.as_i64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed
            .map(Native::from)
            .ok_or_else(|| ValidationError::new("Must be a valid boolean.", "invalid").into())
    }

    fn to_representation(&self, value: &Native, _ctx: &mut Context) -> Result<Value, FieldError> {
        Ok(value.to_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldBuilder;
    use serde_json::json;

    #[test]
    fn char_field_rejects_blank_and_non_strings() {
        let mut ctx = Context::new();
        let field = CharField::new();
        let err = field.run_validation(Some(&json!("  ")), &mut ctx).unwrap_err();
        assert_eq!(err.validation().unwrap().code(), Some("blank"));
        let err = field.run_validation(Some(&json!(true)), &mut ctx).unwrap_err();
        assert_eq!(err.validation().unwrap().code(), Some("invalid"));
        assert_eq!(
            field.run_validation(Some(&json!(12)), &mut ctx).unwrap().as_str(),
            Some("12")
        );
    }

    #[test]
    fn missing_values_follow_required_and_default() {
        let mut ctx = Context::new();
        let err = IntegerField::new().run_validation(None, &mut ctx).unwrap_err();
        assert_eq!(err.validation().unwrap().code(), Some("required"));

        let optional = IntegerField::new().required(false);
        assert_eq!(optional.run_validation(None, &mut ctx), Err(FieldError::Skip));

        let defaulted = IntegerField::new().default_value(3);
        assert_eq!(defaulted.run_validation(None, &mut ctx), Ok(Native::from(3)));
    }

    #[test]
    fn null_requires_allow_null() {
        let mut ctx = Context::new();
        let err = BooleanField::new()
            .run_validation(Some(&Value::Null), &mut ctx)
            .unwrap_err();
        assert_eq!(err.validation().unwrap().code(), Some("null"));
        let nullable = BooleanField::new().allow_null(true);
        assert_eq!(
            nullable.run_validation(Some(&Value::Null), &mut ctx),
            Ok(Native::Null)
        );
    }
}
