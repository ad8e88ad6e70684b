//! # Serializers
//!
//! A [`Serializer`] is an ordered set of named fields plus optional behavior
//! layered on top:
//!
//! - a **composite** part ([`Composite`]) that delegates the rest of a pass to a
//!   child serializer resolved during that pass,
//! - an **unhandled** part ([`UnhandledChild`]) capturing input keys no field
//!   consumed.
//!
//! A serializer is itself a [`Field`], so serializers nest freely inside other
//! serializers and inside the composite list/dict fields.
//!
//! ## Example
//!
//! ```
//! use serializer_framework::{CharField, FieldBuilder, Serializer};
//! use serde_json::json;
//!
//! let person = Serializer::builder("PersonSerializer")
//!     .field("name", CharField::new())
//!     .field("nickname", CharField::new().required(false))
//!     .build();
//!
//! let validated = person.validate(&json!({"name": "Alice"})).unwrap();
//! assert_eq!(person.represent(&validated).unwrap(), json!({"name": "Alice"}));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};
use tracing::trace;

use crate::context::{ChildSlot, Context};
use crate::error::{ErrorDetail, FieldError, ValidationError, NON_FIELD_ERRORS};
use crate::field::{primitive_type_name, Field, FieldOptions};
use crate::native::{set_value, DataType, Native, Validated};
use crate::unhandled::{UnhandledChild, UnhandledOptions};

/// Declarative metadata of a serializer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Meta {
    /// The model type this serializer renders.
    pub model: Option<DataType>,
    /// An explicit resource parameter, used verbatim without inflection.
    pub parameter: Option<String>,
}

/// Metadata shared by reference between a serializer and all of its clones.
#[derive(Clone, Default)]
pub struct CloneMeta {
    entries: Arc<Mutex<HashMap<String, Arc<dyn Any + Send + Sync>>>>,
}

impl CloneMeta {
    pub fn insert<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), Arc::new(value));
    }

    pub fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Whether both handles point at the same metadata.
    pub fn shares_with(&self, other: &CloneMeta) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl fmt::Debug for CloneMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_set().entries(entries.keys()).finish()
    }
}

/// Extension points of a composite serializer.
pub trait CompositeHooks: fmt::Debug + Send + Sync {
    /// Called when the composite is bound as a field of `parent`.
    fn bind(&self, _serializer: &Serializer, _parent: &Serializer) {}

    /// Called before the composite renders an instance, so the child for that
    /// instance can be resolved.
    fn before_representation(
        &self,
        _serializer: &Serializer,
        _instance: &Native,
        _ctx: &mut Context,
    ) -> Result<(), FieldError> {
        Ok(())
    }

    /// Adjusts the per-pass clone of the resolved child.
    fn prepare_child(&self, _serializer: &Serializer, _child: &mut Serializer) {}
}

/// The composite part of a serializer.
#[derive(Clone, Debug)]
pub struct Composite {
    slot: ChildSlot,
    hooks: Arc<dyn CompositeHooks>,
}

impl Composite {
    pub fn new(primary: bool, hooks: impl CompositeHooks + 'static) -> Self {
        Self {
            slot: ChildSlot::new(primary),
            hooks: Arc::new(hooks),
        }
    }

    pub fn slot(&self) -> ChildSlot {
        self.slot
    }

    pub fn hooks(&self) -> &dyn CompositeHooks {
        self.hooks.as_ref()
    }
}

/// A schema of named fields.
#[derive(Clone)]
pub struct Serializer {
    name: Arc<str>,
    options: FieldOptions,
    meta: Meta,
    fields: IndexMap<String, Arc<dyn Field>>,
    composite: Option<Composite>,
    unhandled: Option<Arc<UnhandledChild>>,
    clone_meta: CloneMeta,
    original: Option<Arc<Serializer>>,
}

/// Builder for [`Serializer`].
pub struct SerializerBuilder {
    name: Arc<str>,
    meta: Meta,
    fields: IndexMap<String, Arc<dyn Field>>,
    composite: Option<Composite>,
    unhandled: Option<UnhandledOptions>,
}

impl SerializerBuilder {
    /// Adds a field under `name`, replacing any field of the same name.
    pub fn field(mut self, name: &str, mut field: impl Field) -> Self {
        field.options_mut().bind(name, &self.name);
        self.fields.insert(name.to_string(), Arc::new(field));
        self
    }

    pub fn model(mut self, model: DataType) -> Self {
        self.meta.model = Some(model);
        self
    }

    pub fn parameter(mut self, parameter: impl Into<String>) -> Self {
        self.meta.parameter = Some(parameter.into());
        self
    }

    pub fn composite(mut self, composite: Composite) -> Self {
        self.composite = Some(composite);
        self
    }

    pub fn unhandled(mut self, options: UnhandledOptions) -> Self {
        self.unhandled = Some(options);
        self
    }

    pub fn build(self) -> Serializer {
        let unhandled = self
            .unhandled
            .map(|options| Arc::new(UnhandledChild::new(options, &self.name)));
        let serializer = Serializer {
            name: self.name,
            options: FieldOptions::default(),
            meta: self.meta,
            fields: self.fields,
            composite: self.composite,
            unhandled,
            clone_meta: CloneMeta::default(),
            original: None,
        };
        for field in serializer.fields.values() {
            field.bind(&serializer);
        }
        serializer
    }
}

impl Serializer {
    pub fn builder(name: &str) -> SerializerBuilder {
        SerializerBuilder {
            name: Arc::from(name),
            meta: Meta::default(),
            fields: IndexMap::new(),
            composite: None,
            unhandled: None,
        }
    }

    /// A serializer with no fields.
    pub fn empty() -> Self {
        Self::builder("Serializer").build()
    }

    /// The declared serializer name. Two serializers with the same name are
    /// the same kind of schema.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn fields(&self) -> &IndexMap<String, Arc<dyn Field>> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Arc<dyn Field>> {
        self.fields.get(name)
    }

    /// The first source attribute of every field.
    pub fn field_source_attrs(&self) -> IndexSet<String> {
        self.fields
            .iter()
            .map(|(name, field)| {
                field
                    .options()
                    .source_attrs()
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| name.clone())
            })
            .collect()
    }

    /// Drops the fields for which `keep` returns false.
    pub fn retain_fields(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.fields.retain(|name, _| keep(name));
    }

    pub fn composite(&self) -> Option<&Composite> {
        self.composite.as_ref()
    }

    pub fn slot(&self) -> Option<ChildSlot> {
        self.composite.as_ref().map(Composite::slot)
    }

    pub fn unhandled(&self) -> Option<&UnhandledChild> {
        self.unhandled.as_deref()
    }

    pub fn clone_meta(&self) -> &CloneMeta {
        &self.clone_meta
    }

    /// The serializer this one was cloned from for a pass.
    pub fn original(&self) -> Option<&Arc<Serializer>> {
        self.original.as_ref()
    }

    /// A copy for a single pass. It shares [`CloneMeta`] with `self` and
    /// remembers `self` as its original.
    pub fn clone_for_pass(self: &Arc<Self>) -> Serializer {
        let mut clone = Serializer::clone(self);
        clone.original = Some(Arc::clone(self));
        clone
    }

    /// A configured clone of the child resolved for this composite in `ctx`.
    pub fn get_serializer(&self, ctx: &Context) -> Option<Serializer> {
        let composite = self.composite.as_ref()?;
        let child = composite.slot.current(ctx)?;
        let mut clone = child.clone_for_pass();
        composite.hooks.prepare_child(self, &mut clone);
        Some(clone)
    }

    pub fn validate(&self, data: &Value) -> Result<Native, ValidationError> {
        self.validate_with(data, &mut Context::new())
    }

    /// Validates `data` as the root of a pass.
    pub fn validate_with(&self, data: &Value, ctx: &mut Context) -> Result<Native, ValidationError> {
        ctx.enter_root(self);
        self.to_internal_value(data, ctx)
            .map_err(FieldError::into_validation)
    }

    pub fn represent(&self, instance: &Native) -> Result<Value, FieldError> {
        self.represent_with(instance, &mut Context::new())
    }

    /// Renders `instance` as the root of a pass.
    pub fn represent_with(&self, instance: &Native, ctx: &mut Context) -> Result<Value, FieldError> {
        ctx.enter_root(self);
        self.to_representation(instance, ctx)
    }

    fn origin(&self) -> Arc<Serializer> {
        match &self.original {
            Some(original) => Arc::clone(original),
            None => Arc::new(self.clone()),
        }
    }
}

impl Field for Serializer {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn bind(&self, parent: &Serializer) {
        if let Some(composite) = &self.composite {
            composite.hooks.bind(self, parent);
        }
    }

    fn to_internal_value(&self, data: &Value, ctx: &mut Context) -> Result<Native, FieldError> {
        let Value::Object(object) = data else {
            return Err(ValidationError::new(
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    primitive_type_name(data)
                ),
                "invalid",
            )
            .nested(NON_FIELD_ERRORS)
            .into());
        };

        let mut values = IndexMap::new();
        let mut errors = IndexMap::new();
        for (name, field) in &self.fields {
            let primitive = field.get_value(object);
            match field.run_validation(primitive.as_ref(), ctx) {
                Ok(value) => set_value(&mut values, &field.options().source_attrs(), value),
                Err(FieldError::Skip) => {}
                Err(FieldError::Validation(err)) => {
                    errors.insert(name.clone(), err.into_detail());
                }
                Err(other) => return Err(other),
            }
        }
        if !errors.is_empty() {
            return Err(ValidationError::from_detail(ErrorDetail::Dict(errors)).into());
        }

        let mut origin = None;
        if let Some(child) = self.get_serializer(ctx) {
            trace!(serializer = %self.name, child = %child.name, "delegating validation");
            match child.to_internal_value(data, ctx)? {
                Native::Validated(validated) => {
                    origin = Some(Arc::clone(validated.serializer()));
                    for (key, value) in validated.into_fields() {
                        values.entry(key).or_insert(value);
                    }
                }
                other => {
                    if let Some(entries) = other.entries() {
                        for (key, value) in entries {
                            values.entry(key.clone()).or_insert_with(|| value.clone());
                        }
                    }
                }
            }
        }

        if let Some(unhandled) = &self.unhandled {
            unhandled.collect(self, object, &mut values, ctx)?;
        }

        let serializer = origin.unwrap_or_else(|| self.origin());
        Ok(Native::Validated(Validated::new(values, serializer)))
    }

    fn to_representation(&self, instance: &Native, ctx: &mut Context) -> Result<Value, FieldError> {
        if let Some(composite) = &self.composite {
            composite.hooks.before_representation(self, instance, ctx)?;
        }

        let mut data = Map::new();
        for (name, field) in &self.fields {
            let attribute = match field.get_attribute(instance, ctx) {
                Ok(attribute) => attribute,
                Err(FieldError::Skip) => continue,
                Err(err) => return Err(err),
            };
            let value = if attribute.is_null() {
                Value::Null
            } else {
                field.to_representation(&attribute, ctx)?
            };
            data.insert(name.clone(), value);
        }

        if let Some(child) = self.get_serializer(ctx) {
            trace!(serializer = %self.name, child = %child.name, "delegating representation");
            if let Value::Object(rendered) = child.to_representation(instance, ctx)? {
                for (key, value) in rendered {
                    data.entry(key).or_insert(value);
                }
            }
        }

        if let Some(unhandled) = &self.unhandled {
            unhandled.represent(self, instance, &mut data, ctx)?;
        }

        Ok(Value::Object(data))
    }
}

impl fmt::Debug for Serializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializer")
            .field("name", &self.name)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("meta", &self.meta)
            .field("composite", &self.composite.is_some())
            .field("unhandled", &self.unhandled.is_some())
            .finish()
    }
}
