use std::sync::Arc;

use indexmap::IndexMap;
use serializer_framework::{DataType, Serializer};

/// Parameter and model type lookups of one parameter field.
#[derive(Debug, Clone, Default)]
pub struct SerializerMaps {
    /// Parameter to specific serializer.
    pub specific_serializers: IndexMap<String, Arc<Serializer>>,
    /// Model type to specific serializer.
    pub specific_serializers_by_type: IndexMap<DataType, Arc<Serializer>>,
    /// Serializer name to parameter, the inverse of `specific_serializers`.
    pub parameters: IndexMap<String, String>,
}

impl SerializerMaps {
    /// Registers `serializer` under `parameter`, replacing any previous entry.
    pub fn register(mut self, parameter: impl Into<String>, serializer: Serializer) -> Self {
        self.specific_serializers
            .insert(parameter.into(), Arc::new(serializer));
        self
    }

    /// Registers `serializer` for instances of `data_type`.
    pub fn register_type(mut self, data_type: DataType, serializer: Serializer) -> Self {
        self.specific_serializers_by_type
            .insert(data_type, Arc::new(serializer));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.specific_serializers.is_empty() && self.specific_serializers_by_type.is_empty()
    }

    /// Overlays `other` on top of these maps. Entries of `other` win.
    pub fn merge(&mut self, other: &SerializerMaps) {
        for (parameter, serializer) in &other.specific_serializers {
            self.specific_serializers
                .insert(parameter.clone(), Arc::clone(serializer));
        }
        for (data_type, serializer) in &other.specific_serializers_by_type {
            self.specific_serializers_by_type
                .insert(*data_type, Arc::clone(serializer));
        }
    }

    /// Rebuilds the inverse parameter index.
    pub fn index_parameters(&mut self) {
        self.parameters = self
            .specific_serializers
            .iter()
            .map(|(parameter, serializer)| (serializer.name().to_string(), parameter.clone()))
            .collect();
    }

    pub fn parameter_for(&self, serializer: &Serializer) -> Option<&str> {
        self.parameters.get(serializer.name()).map(String::as_str)
    }
}
