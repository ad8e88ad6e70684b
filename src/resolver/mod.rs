//! # Resource Resolver
//!
//! Discovers which serializer handles which resource by walking a routing
//! table. For every route with a view, the view is instantiated in a detached
//! context and asked for its serializer and queryset; the resulting
//! [`ResourceItem`] names the resource parameter, the model type and the
//! serializer.
//!
//! ## Naming
//!
//! A resource parameter is, in order of preference:
//!
//! 1. the serializer's explicit [`Meta::parameter`](serializer_framework::Meta),
//!    used verbatim;
//! 2. the route segment captured by the configured URL pattern, inflected;
//! 3. the model's verbose name, inflected.
//!
//! The verbose name also applies to a route whose pattern the URL pattern
//! does not capture, such as a detail route (`^widgets/(?P<pk>[^/.]+)/$`).
//! Such a route is named after its model, not left unnamed.
//!
//! ## Precedence
//!
//! Routes are visited pre-order and the first route to claim a parameter or a
//! model type keeps it. Mount an overriding router *before* the router it
//! overrides.

mod inflect;
mod routes;

use std::sync::Arc;

use serializer_framework::{DataType, Serializer};
use tracing::{debug, trace};

use crate::parameter::SerializerMaps;
use crate::settings::ResolverSettings;

pub use inflect::{dasherize, parameterize, pluralize, Inflector, Inflectors};
pub use routes::{QuerysetError, RouteEntry, ViewCallback, ViewContext, ViewSet};

/// What one route contributes to the serializer maps.
#[derive(Debug, Clone, Default)]
pub struct ResourceItem {
    pub parameter: Option<String>,
    pub data_type: Option<DataType>,
    pub serializer: Option<Arc<Serializer>>,
}

/// Looks up the resource parameter, model type and serializer of a view.
pub fn resource_items(
    view: &dyn ViewSet,
    pattern: Option<&str>,
    settings: &ResolverSettings,
) -> ResourceItem {
    let serializer = view.get_serializer();
    let mut data_type = serializer.as_ref().and_then(|s| s.meta().model);
    match view.get_queryset() {
        Ok(model) => data_type = Some(model),
        Err(err) => debug!(%err, ?pattern, "Falling back to the serializer model"),
    }

    let explicit = serializer.as_ref().and_then(|s| s.meta().parameter.clone());
    let parameter = explicit.or_else(|| {
        let uninflected = pattern
            .and_then(|pattern| settings.url_parameter(pattern))
            .or_else(|| data_type.map(|model| model.verbose_name().to_string()))?;
        Some(settings.inflect(&uninflected))
    });

    ResourceItem {
        parameter,
        data_type,
        serializer,
    }
}

/// Collects the parameter and type maps from every view reachable from `route`.
///
/// The inverse parameter index of the result is left empty.
pub fn lookup_serializer_parameters(route: &RouteEntry, settings: &ResolverSettings) -> SerializerMaps {
    let mut maps = SerializerMaps::default();
    collect(route, settings, &mut maps);
    maps
}

fn collect(route: &RouteEntry, settings: &ResolverSettings, maps: &mut SerializerMaps) {
    if let Some(callback) = route.callback() {
        let view = callback(ViewContext::detached());
        let item = resource_items(view.as_ref(), route.pattern(), settings);
        if let Some(serializer) = item.serializer {
            trace!(
                pattern = ?route.pattern(),
                parameter = ?item.parameter,
                serializer = serializer.name(),
                "Discovered resource"
            );
            if let Some(parameter) = item.parameter {
                maps.specific_serializers
                    .entry(parameter)
                    .or_insert_with(|| Arc::clone(&serializer));
            }
            if let Some(data_type) = item.data_type {
                maps.specific_serializers_by_type
                    .entry(data_type)
                    .or_insert(serializer);
            }
        }
    }
    for child in route.children() {
        collect(child, settings, maps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serializer_framework::{CharField, Model};

    #[derive(Serialize)]
    struct Widget {
        name: String,
    }

    impl Model for Widget {
        const VERBOSE_NAME: &'static str = "widget";
    }

    struct StaticView {
        serializer: Option<Arc<Serializer>>,
        queryset: Option<DataType>,
    }

    impl ViewSet for StaticView {
        fn get_serializer(&self) -> Option<Arc<Serializer>> {
            self.serializer.clone()
        }

        fn get_queryset(&self) -> Result<DataType, QuerysetError> {
            self.queryset
                .ok_or_else(|| QuerysetError::Unavailable("no queryset".into()))
        }
    }

    fn serializer(name: &str) -> Arc<Serializer> {
        Arc::new(
            Serializer::builder(name)
                .field("name", CharField::new())
                .model(DataType::of::<Widget>())
                .build(),
        )
    }

    fn view(pattern: &str, name: &'static str) -> RouteEntry {
        RouteEntry::view(pattern, move |_| {
            Box::new(StaticView {
                serializer: Some(serializer(name)),
                queryset: None,
            }) as Box<dyn ViewSet>
        })
    }

    #[test]
    fn names_come_from_url_then_verbose_name() {
        let settings = ResolverSettings::default();
        let view = StaticView {
            serializer: Some(serializer("WidgetSerializer")),
            queryset: None,
        };
        let item = resource_items(&view, Some("^gadget/$"), &settings);
        assert_eq!(item.parameter.as_deref(), Some("gadgets"));
        assert_eq!(item.data_type, Some(DataType::of::<Widget>()));

        let item = resource_items(&view, None, &settings);
        assert_eq!(item.parameter.as_deref(), Some("widgets"));
    }

    #[test]
    fn uncaptured_pattern_falls_back_to_verbose_name() {
        let settings = ResolverSettings::default();
        let view = StaticView {
            serializer: Some(serializer("WidgetSerializer")),
            queryset: None,
        };
        let pattern = "^gadget/(?P<pk>[^/.]+)/$";
        assert_eq!(settings.url_parameter(pattern), None);

        let item = resource_items(&view, Some(pattern), &settings);
        assert_eq!(item.parameter.as_deref(), Some("widgets"));
    }

    #[test]
    fn explicit_parameter_skips_inflection() {
        let explicit = Arc::new(
            Serializer::builder("Explicit")
                .parameter("Widget_Things")
                .build(),
        );
        let view = StaticView {
            serializer: Some(explicit),
            queryset: None,
        };
        let item = resource_items(&view, Some("^gadget/$"), &ResolverSettings::default());
        assert_eq!(item.parameter.as_deref(), Some("Widget_Things"));
        assert_eq!(item.data_type, None);
    }

    #[test]
    fn first_registration_wins_in_pre_order() {
        let route = RouteEntry::root()
            .with_child(RouteEntry::include("^", vec![view("^widget/$", "First")]))
            .with_child(RouteEntry::include(
                "^",
                vec![view("^widget/$", "Second"), view("^gizmo/$", "Third")],
            ));
        let maps = lookup_serializer_parameters(&route, &ResolverSettings::default());
        assert_eq!(maps.specific_serializers["widgets"].name(), "First");
        assert_eq!(maps.specific_serializers["gizmos"].name(), "Third");
        assert_eq!(
            maps.specific_serializers_by_type[&DataType::of::<Widget>()].name(),
            "First"
        );
        assert!(maps.parameters.is_empty());
    }

    #[test]
    fn views_without_serializers_are_omitted() {
        let route = RouteEntry::root().with_child(RouteEntry::view("^empty/$", |_| {
            Box::new(StaticView {
                serializer: None,
                queryset: Some(DataType::of::<Widget>()),
            }) as Box<dyn ViewSet>
        }));
        let maps = lookup_serializer_parameters(&route, &ResolverSettings::default());
        assert!(maps.specific_serializers.is_empty());
        assert!(maps.specific_serializers_by_type.is_empty());
    }
}
