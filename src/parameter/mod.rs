//! # Parameter Fields
//!
//! The discriminator side of parameterized serialization.
//!
//! - [`ParameterField`] - a field holding the parameter (e.g. `"type"`). It owns
//!   the parameter/type to serializer maps and resolves the specific serializer
//!   in both directions: from a parameter value while validating, and from the
//!   instance while rendering.
//! - [`ParameterDictField`] - a dict whose keys are parameters.
//! - [`ParameterValidator`] - resolves on validation and omits the parameter.
//!
//! ## Maps
//!
//! Serializers come from two places: discovery over a routing table
//! ([`crate::resolver`]) and explicit registrations. Explicit registrations win.
//! The merged maps are computed once per field, on first use.
//!
//! ## Binding
//!
//! A field resolves on behalf of the composites bound to it
//! ([`ParameterField::bind_to_composite`]). The resolved serializer is published
//! into each bound composite's slot in the pass [`Context`](serializer_framework::Context).

mod dict;
mod error;
mod field;
mod maps;
mod validator;

pub use dict::ParameterDictField;
pub use error::{MissingSerializerSource, ParameterError};
pub use field::{ParameterField, ParameterFieldBuilder, UrlConf};
pub use maps::SerializerMaps;
pub use validator::ParameterValidator;

/// Key under which a composite finds its bound parameter field.
pub const PARAMETER_FIELD: &str = "parameter_field";
