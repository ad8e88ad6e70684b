use serde::{Deserialize, Serialize};
use serializer_framework::{Model, Native, Record};

/// A person with a display name.
///
/// # Serializers
/// Discovered under the `people` parameter: the model's verbose name,
/// `"person"`, pluralized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
}

impl Model for Person {
    const VERBOSE_NAME: &'static str = "person";
}

impl Person {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// The person as a typed record, ready to be rendered.
    pub fn to_native(&self) -> Result<Native, serde_json::Error> {
        Record::from_model(self).map(Native::from)
    }
}
