//! # Native Values
//!
//! Serializers translate between two worlds:
//!
//! - **Primitive data** ([`serde_json::Value`]) - what travels over the wire.
//! - **Native values** ([`Native`]) - what the application works with.
//!
//! A [`Native`] tree can hold plain containers, typed model instances ([`Record`])
//! and validated data that remembers which serializer produced it ([`Validated`]).
//! The latter two are what allow a serializer to infer "which schema applies"
//! from an instance alone.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{MissingAttribute, MissingKind};
use crate::serializer::Serializer;

/// A model type that instances can be tagged with.
///
/// The verbose name is the human-readable singular name of the model
/// (e.g. `"person"`), used when deriving resource names.
pub trait Model: Serialize + 'static {
    const VERBOSE_NAME: &'static str;
}

/// Runtime identifier of a [`Model`] type.
#[derive(Clone, Copy)]
pub struct DataType {
    id: TypeId,
    name: &'static str,
    verbose_name: &'static str,
}

impl DataType {
    pub fn of<M: Model>() -> Self {
        let name = std::any::type_name::<M>()
            .rsplit("::")
            .next()
            .unwrap_or("Unknown");
        Self {
            id: TypeId::of::<M>(),
            name,
            verbose_name: M::VERBOSE_NAME,
        }
    }

    /// Short type name, e.g. `Person`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn verbose_name(&self) -> &'static str {
        self.verbose_name
    }
}

impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DataType {}

impl Hash for DataType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A model instance: a data type plus its ordered attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    data_type: DataType,
    fields: IndexMap<String, Native>,
}

impl Record {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            fields: IndexMap::new(),
        }
    }

    /// Captures a model's attributes through its `Serialize` implementation.
    pub fn from_model<M: Model>(model: &M) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(model)?;
        let Value::Object(map) = value else {
            return Err(serde::ser::Error::custom(format!(
                "model `{}` did not serialize to an object",
                std::any::type_name::<M>()
            )));
        };
        let mut record = Self::new(DataType::of::<M>());
        for (key, value) in map {
            record.fields.insert(key, Native::from(value));
        }
        Ok(record)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Native>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn fields(&self) -> &IndexMap<String, Native> {
        &self.fields
    }
}

/// Validated data, carrying the serializer that produced it.
#[derive(Clone)]
pub struct Validated {
    fields: IndexMap<String, Native>,
    serializer: Arc<Serializer>,
}

impl Validated {
    pub fn new(fields: IndexMap<String, Native>, serializer: Arc<Serializer>) -> Self {
        Self { fields, serializer }
    }

    pub fn fields(&self) -> &IndexMap<String, Native> {
        &self.fields
    }

    pub fn into_fields(self) -> IndexMap<String, Native> {
        self.fields
    }

    /// The serializer whose validation produced this data.
    pub fn serializer(&self) -> &Arc<Serializer> {
        &self.serializer
    }
}

impl PartialEq for Validated {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields && self.serializer.name() == other.serializer.name()
    }
}

impl fmt::Debug for Validated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validated")
            .field("serializer", &self.serializer.name())
            .field("fields", &self.fields)
            .finish()
    }
}

/// An internal value.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Native {
    #[default]
    Null,
    /// A boolean, number or string.
    Scalar(Value),
    List(Vec<Native>),
    Map(IndexMap<String, Native>),
    Record(Record),
    Validated(Validated),
}

impl Native {
    /// The model type of a record instance.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Native::Record(record) => Some(record.data_type),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Native::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Native::Null)
    }

    /// Name of the instance's type, for diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            Native::Null => "NoneType",
            Native::Scalar(Value::Bool(_)) => "bool",
            Native::Scalar(Value::Number(_)) => "number",
            Native::Scalar(_) => "str",
            Native::List(_) => "list",
            Native::Map(_) => "dict",
            Native::Record(record) => record.data_type.name(),
            Native::Validated(validated) => validated.serializer.name(),
        }
    }

    /// The keyed entries of mapping-like values.
    pub fn entries(&self) -> Option<&IndexMap<String, Native>> {
        match self {
            Native::Map(map) => Some(map),
            Native::Record(record) => Some(&record.fields),
            Native::Validated(validated) => Some(&validated.fields),
            _ => None,
        }
    }

    /// Looks up a single attribute or key.
    pub fn attribute(&self, name: &str) -> Result<&Native, MissingAttribute> {
        let (entries, kind) = match self {
            Native::Map(map) => (Some(map), MissingKind::Key),
            Native::Validated(validated) => (Some(&validated.fields), MissingKind::Key),
            Native::Record(record) => (Some(&record.fields), MissingKind::Attribute),
            _ => (None, MissingKind::Attribute),
        };
        entries
            .and_then(|entries| entries.get(name))
            .ok_or_else(|| MissingAttribute {
                attr: name.to_string(),
                kind,
                type_name: self.type_name().to_string(),
            })
    }

    /// Walks a dotted source path. An empty path yields the instance itself.
    pub fn lookup(&self, attrs: &[String]) -> Result<&Native, MissingAttribute> {
        attrs
            .iter()
            .try_fold(self, |instance, attr| instance.attribute(attr))
    }

    /// Plain conversion to primitive data, without any field formatting.
    pub fn to_value(&self) -> Value {
        match self {
            Native::Null => Value::Null,
            Native::Scalar(value) => value.clone(),
            Native::List(items) => Value::Array(items.iter().map(Native::to_value).collect()),
            Native::Map(_) | Native::Record(_) | Native::Validated(_) => {
                let entries = self.entries().into_iter().flatten();
                Value::Object(
                    entries
                        .map(|(key, value)| (key.clone(), value.to_value()))
                        .collect::<Map<String, Value>>(),
                )
            }
        }
    }
}

impl From<Value> for Native {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Native::Null,
            Value::Array(items) => Native::List(items.into_iter().map(Native::from).collect()),
            Value::Object(map) => Native::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Native::from(value)))
                    .collect(),
            ),
            scalar => Native::Scalar(scalar),
        }
    }
}

impl From<&str> for Native {
    fn from(value: &str) -> Self {
        Native::Scalar(Value::String(value.to_string()))
    }
}

impl From<String> for Native {
    fn from(value: String) -> Self {
        Native::Scalar(Value::String(value))
    }
}

impl From<i64> for Native {
    fn from(value: i64) -> Self {
        Native::Scalar(Value::from(value))
    }
}

impl From<bool> for Native {
    fn from(value: bool) -> Self {
        Native::Scalar(Value::Bool(value))
    }
}

impl From<Record> for Native {
    fn from(record: Record) -> Self {
        Native::Record(record)
    }
}

impl From<Validated> for Native {
    fn from(validated: Validated) -> Self {
        Native::Validated(validated)
    }
}

/// Writes `value` into `target` at the given source path.
///
/// An empty path merges a mapping value into `target` directly.
pub fn set_value(target: &mut IndexMap<String, Native>, attrs: &[String], value: Native) {
    let Some((last, parents)) = attrs.split_last() else {
        if let Some(entries) = value.entries() {
            for (key, value) in entries {
                target.insert(key.clone(), value.clone());
            }
        }
        return;
    };
    let mut current = target;
    for attr in parents {
        let slot = current
            .entry(attr.clone())
            .or_insert_with(|| Native::Map(IndexMap::new()));
        if !matches!(slot, Native::Map(_)) {
            *slot = Native::Map(IndexMap::new());
        }
        current = match slot {
            Native::Map(next) => next,
            _ => return,
        };
    }
    current.insert(last.clone(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Widget {
        id: u32,
        label: String,
    }

    impl Model for Widget {
        const VERBOSE_NAME: &'static str = "widget";
    }

    #[test]
    fn record_from_model_keeps_field_order() {
        let record = Record::from_model(&Widget { id: 7, label: "gear".into() }).unwrap();
        assert_eq!(record.data_type(), DataType::of::<Widget>());
        assert_eq!(record.data_type().name(), "Widget");
        let keys: Vec<_> = record.fields().keys().cloned().collect();
        assert_eq!(keys, vec!["id", "label"]);
    }

    #[test]
    fn lookup_walks_nested_paths() {
        let native = Native::from(json!({"owner": {"name": "Alice"}}));
        let attrs = vec!["owner".to_string(), "name".to_string()];
        assert_eq!(native.lookup(&attrs).unwrap().as_str(), Some("Alice"));

        let missing = native.lookup(&["nope".to_string()]).unwrap_err();
        assert_eq!(missing.kind, MissingKind::Key);
        assert_eq!(missing.attr, "nope");
    }

    #[test]
    fn missing_record_attribute_is_an_attribute_error() {
        let record = Native::from(Record::new(DataType::of::<Widget>()));
        let missing = record.attribute("type").unwrap_err();
        assert_eq!(missing.kind, MissingKind::Attribute);
        assert_eq!(missing.type_name, "Widget");
    }

    #[test]
    fn set_value_creates_intermediate_maps_and_merges_star_sources() {
        let mut target = IndexMap::new();
        set_value(&mut target, &["a".into(), "b".into()], Native::from(1));
        set_value(&mut target, &[], Native::from(json!({"c": true})));
        assert_eq!(
            Native::Map(target).to_value(),
            json!({"a": {"b": 1}, "c": true})
        );
    }
}
