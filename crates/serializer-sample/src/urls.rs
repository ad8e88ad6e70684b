//! # Routing
//!
//! A router registers views under URL prefixes and expands each into an API
//! root, a list route (`^people/$`) and a detail route
//! (`^people/(?P<pk>[^/.]+)/$`).
//!
//! The sample table mounts an override router before the main router, so its
//! `people` view wins discovery.

use std::sync::Arc;

use parameterized_serializers::resolver::{RouteEntry, ViewCallback, ViewContext, ViewSet};

use crate::viewsets::{self, ApiRootView};

/// Expands registered views into list and detail routes.
#[derive(Clone, Default)]
pub struct Router {
    registry: Vec<(String, ViewCallback)>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        mut self,
        prefix: impl Into<String>,
        view: impl Fn(ViewContext) -> Box<dyn ViewSet> + Send + Sync + 'static,
    ) -> Self {
        self.registry.push((prefix.into(), Arc::new(view)));
        self
    }

    pub fn urls(&self) -> Vec<RouteEntry> {
        let mut urls = vec![RouteEntry::view("^$", |_| {
            Box::new(ApiRootView) as Box<dyn ViewSet>
        })];
        for (prefix, view) in &self.registry {
            let list = Arc::clone(view);
            urls.push(RouteEntry::view(format!("^{prefix}/$"), move |ctx| list(ctx)));
            let detail = Arc::clone(view);
            urls.push(RouteEntry::view(
                format!("^{prefix}/(?P<pk>[^/.]+)/$"),
                move |ctx| detail(ctx),
            ));
        }
        urls
    }
}

pub fn router() -> Router {
    Router::new()
        .register("people", viewsets::example_person_viewset)
        .register("types", viewsets::example_type_field_viewset)
        .register("wo-model", viewsets::example_viewset_wo_model)
        .register("types-unhandled", viewsets::example_unhandled_viewset)
}

pub fn override_router() -> Router {
    Router::new().register("people", viewsets::overridden_person_viewset)
}

/// The routing table of the sample application.
pub fn root() -> RouteEntry {
    RouteEntry::root()
        .with_child(RouteEntry::include("^", override_router().urls()))
        .with_child(RouteEntry::include("^", router().urls()))
}
