//! The routing table seen by the resolver.
//!
//! Only what the resolver needs is modelled: a tree of entries, each with an
//! optional pattern text and an optional view callback.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use serializer_framework::{DataType, Serializer};

/// A view's queryset could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuerysetError {
    #[error("queryset unavailable: {0}")]
    Unavailable(String),
}

/// Request context a view is instantiated with.
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
    pub request: Option<Value>,
    pub format: Option<String>,
}

impl ViewContext {
    /// A context without any request, used for introspection.
    pub fn detached() -> Self {
        Self::default()
    }
}

/// The serializer-bearing part of a view.
pub trait ViewSet: Send + Sync {
    /// The serializer this view renders with.
    fn get_serializer(&self) -> Option<Arc<Serializer>>;

    /// The model type of the view's queryset.
    fn get_queryset(&self) -> Result<DataType, QuerysetError> {
        Err(QuerysetError::Unavailable(
            "view does not define a queryset".to_string(),
        ))
    }
}

/// Instantiates a view for a context.
pub type ViewCallback = Arc<dyn Fn(ViewContext) -> Box<dyn ViewSet> + Send + Sync>;

/// One entry of a routing table.
#[derive(Clone, Default)]
pub struct RouteEntry {
    pattern: Option<String>,
    callback: Option<ViewCallback>,
    children: Vec<RouteEntry>,
}

impl RouteEntry {
    /// An empty root table.
    pub fn root() -> Self {
        Self::default()
    }

    /// A route to a view.
    pub fn view(
        pattern: impl Into<String>,
        callback: impl Fn(ViewContext) -> Box<dyn ViewSet> + Send + Sync + 'static,
    ) -> Self {
        Self {
            pattern: Some(pattern.into()),
            callback: Some(Arc::new(callback)),
            children: Vec::new(),
        }
    }

    /// A nested table mounted under `pattern`.
    pub fn include(pattern: impl Into<String>, children: Vec<RouteEntry>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            callback: None,
            children,
        }
    }

    pub fn with_child(mut self, child: RouteEntry) -> Self {
        self.children.push(child);
        self
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn callback(&self) -> Option<&ViewCallback> {
        self.callback.as_ref()
    }

    pub fn children(&self) -> &[RouteEntry] {
        &self.children
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("pattern", &self.pattern)
            .field("callback", &self.callback.is_some())
            .field("children", &self.children)
            .finish()
    }
}
