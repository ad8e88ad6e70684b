//! The discriminator field.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use serde_json::Value;
use serializer_framework::{
    ChildSlot, Context, DataType, Field, FieldError, FieldOptions, Native, Serializer,
    UnvalidatedField,
};
use tracing::{debug, info};

use super::error::{parameter_text, MissingSerializerSource, ParameterError};
use super::maps::SerializerMaps;
use super::validator::ParameterValidator;
use super::PARAMETER_FIELD;
use crate::resolver::{lookup_serializer_parameters, RouteEntry};
use crate::settings::ResolverSettings;

/// Produces the routing table serializers are discovered from.
pub type UrlConf = Arc<dyn Fn() -> RouteEntry + Send + Sync>;

struct Shared {
    urlconf: Option<UrlConf>,
    settings: ResolverSettings,
    explicit: SerializerMaps,
    skip: bool,
    maps: OnceLock<SerializerMaps>,
    bound: Mutex<Vec<ChildSlot>>,
}

/// Maps a parameter to its specific serializer and back.
///
/// Clones are handles onto the same field: they share the serializer maps and
/// the composites bound to the field.
#[derive(Clone)]
pub struct ParameterField {
    options: FieldOptions,
    child: UnvalidatedField,
    shared: Arc<Shared>,
}

/// Builder for [`ParameterField`].
pub struct ParameterFieldBuilder {
    urlconf: Option<UrlConf>,
    settings: Option<ResolverSettings>,
    explicit: SerializerMaps,
    skip: bool,
}

impl ParameterFieldBuilder {
    /// Discover serializers from the routing table `urlconf` returns.
    pub fn urlconf(mut self, urlconf: impl Fn() -> RouteEntry + Send + Sync + 'static) -> Self {
        self.urlconf = Some(Arc::new(urlconf));
        self
    }

    pub fn settings(mut self, settings: ResolverSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Registers a specific serializer for a parameter. Overrides discovery.
    pub fn register(mut self, parameter: impl Into<String>, serializer: Serializer) -> Self {
        self.explicit = self.explicit.register(parameter, serializer);
        self
    }

    /// Registers a specific serializer for a model type. Overrides discovery.
    pub fn register_type(mut self, data_type: DataType, serializer: Serializer) -> Self {
        self.explicit = self.explicit.register_type(data_type, serializer);
        self
    }

    /// Whether the parameter is left out of validated data. Defaults to true.
    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    pub fn build(self) -> Result<ParameterField, MissingSerializerSource> {
        if self.urlconf.is_none() && self.explicit.is_empty() {
            return Err(MissingSerializerSource);
        }
        let mut options = FieldOptions::default();
        options.push_validator(Arc::new(ParameterValidator));
        Ok(ParameterField {
            options,
            child: UnvalidatedField::new(),
            shared: Arc::new(Shared {
                urlconf: self.urlconf,
                settings: self
                    .settings
                    .unwrap_or_else(|| ResolverSettings::global().clone()),
                explicit: self.explicit,
                skip: self.skip,
                maps: OnceLock::new(),
                bound: Mutex::new(Vec::new()),
            }),
        })
    }
}

impl ParameterField {
    pub fn builder() -> ParameterFieldBuilder {
        ParameterFieldBuilder {
            urlconf: None,
            settings: None,
            explicit: SerializerMaps::default(),
            skip: true,
        }
    }

    pub fn skip(&self) -> bool {
        self.shared.skip
    }

    /// Lets `serializer` find this field, and delegate to the serializers it
    /// resolves if `serializer` is a composite.
    pub fn bind_to_composite(&self, serializer: &Serializer) {
        serializer.clone_meta().insert(PARAMETER_FIELD, self.clone());
        if let Some(slot) = serializer.slot() {
            let mut bound = self
                .shared
                .bound
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !bound.contains(&slot) {
                bound.push(slot);
            }
        }
    }

    /// The merged serializer maps, built on first use.
    pub fn maps(&self) -> &SerializerMaps {
        self.shared.maps.get_or_init(|| self.merge_serializer_parameters())
    }

    fn merge_serializer_parameters(&self) -> SerializerMaps {
        let mut maps = match &self.shared.urlconf {
            Some(urlconf) => lookup_serializer_parameters(&urlconf(), &self.shared.settings),
            None => SerializerMaps::default(),
        };
        maps.merge(&self.shared.explicit);
        maps.index_parameters();
        info!(
            field = self.options.field_name(),
            parameters = maps.specific_serializers.len(),
            types = maps.specific_serializers_by_type.len(),
            "Built specific serializer maps"
        );
        maps
    }

    fn bound_slots(&self) -> Vec<ChildSlot> {
        self.shared
            .bound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The serializer the serving view picked, if the first bound composite is
    /// the root of this pass.
    fn view_serializer(&self, ctx: &Context) -> Option<Arc<Serializer>> {
        self.bound_slots().first()?.view_serializer(ctx)
    }

    fn publish(&self, ctx: &mut Context, serializer: Arc<Serializer>) {
        for slot in self.bound_slots() {
            slot.observe(ctx, Arc::clone(&serializer));
        }
    }

    /// Resolves the specific serializer for `parameter` and hands it to every
    /// bound composite.
    pub fn lookup_schema(
        &self,
        parameter: &str,
        ctx: &mut Context,
    ) -> Result<Arc<Serializer>, ParameterError> {
        let maps = self.maps();
        let Some(specific) = maps.specific_serializers.get(parameter) else {
            return Err(ParameterError::UnknownParameter {
                parameter: parameter.to_string(),
            });
        };

        let child = match self.view_serializer(ctx) {
            Some(view) => {
                let by_type = maps.parameter_for(&view).ok_or_else(|| {
                    ParameterError::SerializerNotRegistered {
                        serializer: view.name().to_string(),
                    }
                })?;
                if by_type != parameter {
                    return Err(ParameterError::ParameterMismatch {
                        parameter: parameter.to_string(),
                        by_type: by_type.to_string(),
                    });
                }
                view
            }
            None => Arc::clone(specific),
        };

        debug!(parameter, serializer = child.name(), "Resolved specific serializer");
        self.publish(ctx, Arc::clone(&child));
        Ok(child)
    }

    /// Infers the parameter from an instance and hands the matching serializer
    /// to every bound composite.
    pub fn lookup_parameter(
        &self,
        instance: &Native,
        ctx: &mut Context,
    ) -> Result<String, ParameterError> {
        let maps = self.maps();
        let child = match instance {
            Native::Validated(validated) => Arc::clone(validated.serializer()),
            other => other
                .data_type()
                .and_then(|data_type| maps.specific_serializers_by_type.get(&data_type))
                .cloned()
                .ok_or_else(|| ParameterError::instance(other))?,
        };
        let parameter = maps
            .parameter_for(&child)
            .ok_or_else(|| ParameterError::SerializerNotRegistered {
                serializer: child.name().to_string(),
            })?
            .to_string();

        let child = self.view_serializer(ctx).unwrap_or(child);
        debug!(%parameter, serializer = child.name(), "Inferred parameter from instance");
        self.publish(ctx, child);
        Ok(parameter)
    }
}

impl Field for ParameterField {
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
        self.bind_to_composite(parent);
    }

    fn to_internal_value(&self, data: &Value, ctx: &mut Context) -> Result<Native, FieldError> {
        self.child.to_internal_value(data, ctx)
    }

    fn to_representation(&self, value: &Native, ctx: &mut Context) -> Result<Value, FieldError> {
        self.child.to_representation(value, ctx)
    }

    /// Reads the parameter off the instance, or infers it from the instance
    /// when the instance has no such attribute.
    fn get_attribute(&self, instance: &Native, ctx: &mut Context) -> Result<Native, FieldError> {
        let options = &self.options;
        let missing = if options.is_bound() {
            match instance.lookup(&options.source_attrs()) {
                Ok(value) => {
                    self.lookup_schema(&parameter_text(value), ctx)?;
                    return Ok(value.clone());
                }
                Err(missing) => Some(missing),
            }
        } else {
            None
        };

        let err = match self.lookup_parameter(instance, ctx) {
            Ok(parameter) => return Ok(Native::from(parameter)),
            Err(err) => err,
        };
        debug!(%err, field = options.field_name(), "Could not infer parameter from instance");

        if let Some(default) = options.default_value() {
            let parameter = Native::from(default.clone());
            self.lookup_schema(&parameter_text(&parameter), ctx)?;
            return Ok(parameter);
        }
        if !options.required() {
            self.publish(ctx, Arc::new(Serializer::empty()));
            return Err(FieldError::Skip);
        }
        match missing {
            Some(missing) => Err(missing
                .annotate(
                    options.field_name(),
                    options.parent_name(),
                    instance.type_name(),
                )
                .into()),
            None => Err(err.into()),
        }
    }

    fn run_validation(&self, data: Option<&Value>, ctx: &mut Context) -> Result<Native, FieldError> {
        // A default still has to select the specific serializer.
        let data = data.or(self.options.default_value());
        serializer_framework::field::validate_field(self, data, ctx)
    }
}

impl fmt::Debug for ParameterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterField")
            .field("field_name", &self.options.field_name())
            .field("skip", &self.shared.skip)
            .field("urlconf", &self.shared.urlconf.is_some())
            .field("resolved", &self.shared.maps.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serializer_framework::{CharField, FieldBuilder};

    fn child(name: &str) -> Serializer {
        Serializer::builder(name)
            .field("name", CharField::new())
            .build()
    }

    fn field() -> ParameterField {
        ParameterField::builder()
            .register("foo-type", child("FooSerializer"))
            .register("bar-type", child("BarSerializer"))
            .build()
            .unwrap()
    }

    #[test]
    fn build_requires_a_source_of_serializers() {
        assert_eq!(
            ParameterField::builder().build().unwrap_err(),
            MissingSerializerSource
        );
    }

    #[test]
    fn maps_are_built_once_and_shared_by_clones() {
        let field = field();
        let clone = field.clone();
        assert!(std::ptr::eq(field.maps(), clone.maps()));
        assert_eq!(field.maps().parameter_for(&child("BarSerializer")), Some("bar-type"));
    }

    #[test]
    fn unknown_parameters_are_rejected() {
        let err = field()
            .lookup_schema("nope", &mut Context::new())
            .unwrap_err();
        assert_eq!(err.code(), "unknown");
    }

    #[test]
    fn validated_parameter_is_skipped_unless_retained() {
        let mut ctx = Context::new();
        assert_eq!(
            field().run_validation(Some(&json!("foo-type")), &mut ctx),
            Err(FieldError::Skip)
        );

        let retained = ParameterField::builder()
            .register("foo-type", child("FooSerializer"))
            .skip(false)
            .build()
            .unwrap();
        assert_eq!(
            retained.run_validation(Some(&json!("foo-type")), &mut ctx),
            Ok(Native::from("foo-type"))
        );
    }

    #[test]
    fn optional_field_skips_unknown_instances() {
        let field = field().required(false);
        let instance = Native::from(json!({"name": "x"}));
        assert_eq!(
            field.get_attribute(&instance, &mut Context::new()),
            Err(FieldError::Skip)
        );
    }

    #[test]
    fn default_parameter_is_used_for_unknown_instances() {
        let field = field().default_value("bar-type");
        let value = field
            .get_attribute(&Native::from(json!({})), &mut Context::new())
            .unwrap();
        assert_eq!(value.as_str(), Some("bar-type"));
    }
}
