//! # The Field Contract
//!
//! Every piece of a schema is a [`Field`]: scalar fields, nested serializers and
//! composite list/dict fields alike. A field knows how to:
//!
//! - pick its primitive value out of incoming data ([`Field::get_value`]),
//! - validate it into a native value ([`Field::run_validation`]),
//! - read its native value off an instance ([`Field::get_attribute`]),
//! - render a native value back to primitive data ([`Field::to_representation`]).
//!
//! Only the conversions are required; the rest are **provided methods** that
//! implement the common behavior (required/default/null handling, source paths
//! and validators) on top of [`FieldOptions`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::{FieldError, ValidationError};
use crate::native::Native;
use crate::serializer::Serializer;

/// A check run on a field's native value after conversion.
///
/// The validator receives the field it is attached to, so field-specific
/// validators can downcast it through [`Field::as_any`].
pub trait Validator: fmt::Debug + Send + Sync {
    fn validate(&self, value: &Native, field: &dyn Any, ctx: &mut Context) -> Result<(), FieldError>;
}

/// Declarative options shared by every field.
#[derive(Clone, Default)]
pub struct FieldOptions {
    field_name: String,
    parent: Option<String>,
    source: Option<String>,
    required: Option<bool>,
    default: Option<Value>,
    allow_null: bool,
    label: Option<String>,
    help_text: Option<String>,
    validators: Vec<Arc<dyn Validator>>,
}

impl FieldOptions {
    /// Attaches the field to its name in a parent serializer.
    pub fn bind(&mut self, field_name: &str, parent: &str) {
        self.field_name = field_name.to_string();
        self.parent = Some(parent.to_string());
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Name of the serializer this field was declared on.
    pub fn parent_name(&self) -> &str {
        self.parent.as_deref().unwrap_or("")
    }

    /// Whether the field has anything to read from an instance.
    pub fn is_bound(&self) -> bool {
        !self.field_name.is_empty() || self.source.is_some()
    }

    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.field_name)
    }

    /// The dotted source split into attributes. `*` means the whole instance.
    pub fn source_attrs(&self) -> Vec<String> {
        match self.source() {
            "*" => Vec::new(),
            source => source.split('.').map(str::to_string).collect(),
        }
    }

    /// Required unless explicitly configured or a default is present.
    pub fn required(&self) -> bool {
        self.required.unwrap_or(self.default.is_none())
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn allow_null(&self) -> bool {
        self.allow_null
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    pub fn validators(&self) -> &[Arc<dyn Validator>] {
        &self.validators
    }

    pub fn push_validator(&mut self, validator: Arc<dyn Validator>) {
        self.validators.push(validator);
    }
}

impl fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOptions")
            .field("field_name", &self.field_name)
            .field("source", &self.source)
            .field("required", &self.required())
            .field("default", &self.default)
            .field("allow_null", &self.allow_null)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// A schema field.
pub trait Field: fmt::Debug + Send + Sync + 'static {
    fn options(&self) -> &FieldOptions;

    fn options_mut(&mut self) -> &mut FieldOptions;

    fn as_any(&self) -> &dyn Any;

    /// Converts validated primitive data into a native value.
    fn to_internal_value(&self, data: &Value, ctx: &mut Context) -> Result<Native, FieldError>;

    /// Converts a native value into primitive data.
    fn to_representation(&self, value: &Native, ctx: &mut Context) -> Result<Value, FieldError>;

    /// Called once the parent serializer has been assembled.
    fn bind(&self, _parent: &Serializer) {}

    fn get_value(&self, data: &Map<String, Value>) -> Option<Value> {
        data.get(self.options().field_name()).cloned()
    }

    fn get_attribute(&self, instance: &Native, _ctx: &mut Context) -> Result<Native, FieldError> {
        default_attribute(self.options(), instance)
    }

    fn run_validation(&self, data: Option<&Value>, ctx: &mut Context) -> Result<Native, FieldError> {
        validate_field(self, data, ctx)
    }
}

/// Chainable configuration for any field.
pub trait FieldBuilder: Field + Sized {
    fn source(mut self, source: impl Into<String>) -> Self {
        self.options_mut().source = Some(source.into());
        self
    }

    fn required(mut self, required: bool) -> Self {
        self.options_mut().required = Some(required);
        self
    }

    fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.options_mut().default = Some(default.into());
        self
    }

    fn allow_null(mut self, allow_null: bool) -> Self {
        self.options_mut().allow_null = allow_null;
        self
    }

    fn label(mut self, label: impl Into<String>) -> Self {
        self.options_mut().label = Some(label.into());
        self
    }

    fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.options_mut().help_text = Some(help_text.into());
        self
    }

    fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.options_mut().push_validator(Arc::new(validator));
        self
    }
}

impl<F: Field> FieldBuilder for F {}

/// Reads a field's value off an instance, falling back to its default.
pub fn default_attribute(options: &FieldOptions, instance: &Native) -> Result<Native, FieldError> {
    match instance.lookup(&options.source_attrs()) {
        Ok(value) => Ok(value.clone()),
        Err(missing) => {
            if let Some(default) = options.default_value() {
                return Ok(Native::from(default.clone()));
            }
            if options.allow_null() {
                return Ok(Native::Null);
            }
            if !options.required() {
                return Err(FieldError::Skip);
            }
            Err(missing
                .annotate(
                    options.field_name(),
                    options.parent_name(),
                    instance.type_name(),
                )
                .into())
        }
    }
}

/// Required/default/null handling, conversion, then validators.
pub fn validate_field<F: Field + ?Sized>(
    field: &F,
    data: Option<&Value>,
    ctx: &mut Context,
) -> Result<Native, FieldError> {
    let options = field.options();
    let data = match data {
        None => {
            if let Some(default) = options.default_value() {
                return Ok(Native::from(default.clone()));
            }
            if options.required() {
                return Err(ValidationError::new("This field is required.", "required").into());
            }
            return Err(FieldError::Skip);
        }
        Some(Value::Null) if options.allow_null() => return Ok(Native::Null),
        Some(Value::Null) => {
            return Err(ValidationError::new("This field may not be null.", "null").into());
        }
        Some(data) => data,
    };
    let value = field.to_internal_value(data, ctx)?;
    for validator in options.validators() {
        validator.validate(&value, field.as_any(), ctx)?;
    }
    Ok(value)
}

/// Python-style name of a primitive value's type, for error messages.
pub fn primitive_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
