use serde::{Deserialize, Serialize};
use serializer_framework::{Model, Native, Record};

/// An article written by a [`Person`](super::Person).
///
/// No view serves articles, so no serializer is discovered for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub author: i64,
}

impl Model for Article {
    const VERBOSE_NAME: &'static str = "article";
}

impl Article {
    pub fn to_native(&self) -> Result<Native, serde_json::Error> {
        Record::from_model(self).map(Native::from)
    }
}
