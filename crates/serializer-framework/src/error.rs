//! # Framework Errors
//!
//! Two kinds of failures flow through a serialization pass:
//!
//! - [`ValidationError`] - a structured, user-facing error tree. Every field
//!   error ends up here, nested under the name of the field that produced it.
//! - [`FieldError`] - what field hooks return. Besides validation errors it
//!   carries the "omit this field" signal ([`FieldError::Skip`]) and
//!   missing-attribute conditions raised while reading instances.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Key under which errors that belong to no single field are collected.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// A single error message with its machine-readable code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorMessage {
    pub message: String,
    pub code: String,
}

impl Serialize for ErrorMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.message)
    }
}

/// The error tree of a [`ValidationError`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    List(Vec<ErrorMessage>),
    Dict(IndexMap<String, ErrorDetail>),
}

impl ErrorDetail {
    /// The nested detail for a field name, if this is a dict of errors.
    pub fn get(&self, key: &str) -> Option<&ErrorDetail> {
        match self {
            ErrorDetail::Dict(map) => map.get(key),
            ErrorDetail::List(_) => None,
        }
    }

    pub fn messages(&self) -> &[ErrorMessage] {
        match self {
            ErrorDetail::List(messages) => messages,
            ErrorDetail::Dict(_) => &[],
        }
    }

    /// Code of the first message found, depth first.
    pub fn code(&self) -> Option<&str> {
        match self {
            ErrorDetail::List(messages) => messages.first().map(|m| m.code.as_str()),
            ErrorDetail::Dict(map) => map.values().find_map(ErrorDetail::code),
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

/// A structured validation failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{detail}")]
pub struct ValidationError {
    detail: ErrorDetail,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            detail: ErrorDetail::List(vec![ErrorMessage {
                message: message.into(),
                code: code.into(),
            }]),
        }
    }

    pub fn from_detail(detail: ErrorDetail) -> Self {
        Self { detail }
    }

    /// Re-roots this error under `key`.
    pub fn nested(self, key: impl Into<String>) -> Self {
        let mut map = IndexMap::new();
        map.insert(key.into(), self.detail);
        Self {
            detail: ErrorDetail::Dict(map),
        }
    }

    pub fn detail(&self) -> &ErrorDetail {
        &self.detail
    }

    pub fn into_detail(self) -> ErrorDetail {
        self.detail
    }

    pub fn code(&self) -> Option<&str> {
        self.detail.code()
    }
}

/// Whether a missing value was looked up as a key or as an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingKind {
    Key,
    Attribute,
}

impl fmt::Display for MissingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingKind::Key => f.write_str("KeyError"),
            MissingKind::Attribute => f.write_str("AttributeError"),
        }
    }
}

/// An instance did not have the requested attribute or key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingAttribute {
    pub attr: String,
    pub kind: MissingKind,
    /// Type of the instance the lookup was performed on.
    pub type_name: String,
}

impl fmt::Display for MissingAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MissingKind::Key => write!(f, "{:?}", self.attr),
            MissingKind::Attribute => write!(
                f,
                "'{}' object has no attribute '{}'",
                self.type_name, self.attr
            ),
        }
    }
}

impl std::error::Error for MissingAttribute {}

impl MissingAttribute {
    /// Adds the field and serializer context to the bare lookup failure.
    pub fn annotate(
        self,
        field: impl Into<String>,
        serializer: impl Into<String>,
        instance: impl Into<String>,
    ) -> AttributeError {
        AttributeError {
            field: field.into(),
            serializer: serializer.into(),
            instance: instance.into(),
            source: self,
        }
    }
}

/// A missing attribute annotated with where it was being read.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error(
    "Got {} when attempting to get a value for field `{field}` on serializer `{serializer}`.\n\
     The serializer field might be named incorrectly and not match any attribute or key \
     on the `{instance}` instance.\nOriginal exception text was: {source}.",
    .source.kind
)]
pub struct AttributeError {
    pub field: String,
    pub serializer: String,
    pub instance: String,
    pub source: MissingAttribute,
}

/// Outcome of a field hook that did not produce a value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The field should be omitted from the output. Not a failure.
    #[error("field omitted")]
    Skip,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Missing(#[from] MissingAttribute),
    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

impl FieldError {
    pub fn is_skip(&self) -> bool {
        matches!(self, FieldError::Skip)
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            FieldError::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// Converts any failure into a user-facing error tree.
    pub fn into_validation(self) -> ValidationError {
        match self {
            FieldError::Validation(err) => err,
            other => ValidationError::new(other.to_string(), "invalid").nested(NON_FIELD_ERRORS),
        }
    }
}
