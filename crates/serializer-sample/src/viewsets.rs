//! Views of the sample application.
//!
//! Views only carry what serializer discovery asks of them: the serializer
//! they render with and, for model views, the model of their queryset.

use std::sync::Arc;

use parameterized_serializers::parameter::MissingSerializerSource;
use parameterized_serializers::resolver::{QuerysetError, ViewContext, ViewSet};
use serializer_framework::{DataType, Serializer};
use tracing::warn;

use crate::model::Person;
use crate::serializers;

/// A view serving one serializer.
#[derive(Debug)]
pub struct ExampleViewSet {
    serializer: Option<Arc<Serializer>>,
    queryset: Option<DataType>,
    context: ViewContext,
}

impl ExampleViewSet {
    pub fn new(serializer: Serializer, context: ViewContext) -> Self {
        Self {
            serializer: Some(Arc::new(serializer)),
            queryset: None,
            context,
        }
    }

    /// A view whose serializer could not be built serves nothing.
    pub fn try_new(
        serializer: Result<Serializer, MissingSerializerSource>,
        context: ViewContext,
    ) -> Self {
        let serializer = serializer
            .inspect_err(|err| warn!(%err, "View has no serializer"))
            .ok()
            .map(Arc::new);
        Self {
            serializer,
            queryset: None,
            context,
        }
    }

    pub fn with_queryset(mut self, model: DataType) -> Self {
        self.queryset = Some(model);
        self
    }

    pub fn context(&self) -> &ViewContext {
        &self.context
    }
}

impl ViewSet for ExampleViewSet {
    fn get_serializer(&self) -> Option<Arc<Serializer>> {
        self.serializer.clone()
    }

    fn get_queryset(&self) -> Result<DataType, QuerysetError> {
        self.queryset.ok_or_else(|| {
            QuerysetError::Unavailable("view does not define a queryset".to_string())
        })
    }
}

/// Lists the routes of a router. Has no serializer.
#[derive(Debug, Default)]
pub struct ApiRootView;

impl ViewSet for ApiRootView {
    fn get_serializer(&self) -> Option<Arc<Serializer>> {
        None
    }
}

pub fn example_person_viewset(context: ViewContext) -> Box<dyn ViewSet> {
    Box::new(
        ExampleViewSet::new(serializers::example_person_serializer(), context)
            .with_queryset(DataType::of::<Person>()),
    )
}

pub fn overridden_person_viewset(context: ViewContext) -> Box<dyn ViewSet> {
    Box::new(
        ExampleViewSet::new(serializers::overridden_person_serializer(), context)
            .with_queryset(DataType::of::<Person>()),
    )
}

pub fn example_type_field_viewset(context: ViewContext) -> Box<dyn ViewSet> {
    Box::new(ExampleViewSet::try_new(
        serializers::example_type_field_serializer(),
        context,
    ))
}

pub fn example_viewset_wo_model(context: ViewContext) -> Box<dyn ViewSet> {
    Box::new(ExampleViewSet::new(
        serializers::example_serializer_wo_model(),
        context,
    ))
}

pub fn example_unhandled_viewset(context: ViewContext) -> Box<dyn ViewSet> {
    Box::new(ExampleViewSet::new(
        serializers::example_unhandled_serializer(),
        context,
    ))
}
