//! # Parameterized Serializers
//!
//! > **Polymorphic serialization driven by a discriminator.**
//!
//! One generic serializer, many specific schemas: a *parameter* such as
//! `"type": "people"` selects which specific serializer processes the rest of
//! the data, and rendering an instance infers the parameter back from the
//! instance's type.
//!
//! ## Core Concepts
//!
//! ### Discovery
//! Which serializer handles which parameter is discovered from the routing
//! table: every view contributes its serializer under a name derived from its
//! route (`^people/$` becomes `people`) or its model. Explicit registrations
//! override discovery. See [`resolver`].
//!
//! ### Resolution
//! A [`ParameterField`] owns the resulting maps and resolves in both
//! directions:
//! - **validating**: the parameter value selects the specific serializer;
//! - **rendering**: the instance (its model type, or the serializer that
//!   validated it) selects the specific serializer and the parameter.
//!
//! ### Delegation
//! A generic serializer ([`GenericSerializer`]) is a composite bound to a
//! parameter field. Once the field resolves, the composite delegates the rest
//! of the pass to the resolved serializer. Resolution is per pass: it lives in
//! the pass [`Context`](serializer_framework::Context), never in the
//! serializers, so serializers are shared freely between threads.
//!
//! ## Module Tour
//!
//! - [`resolver`] - routing table model, resource naming and inflection
//! - [`parameter`] - parameter field, parameter dict field, validator, errors
//! - [`generic`] - the parameterized generic serializer
//! - [`settings`] - URL pattern and inflector configuration
//! - [`telemetry`] - tracing setup
//!
//! ## Quick Start
//!
//! ```rust
//! use parameterized_serializers::{GenericSerializer, ParameterField};
//! use serializer_framework::{CharField, Serializer};
//! use serde_json::json;
//!
//! let child = Serializer::builder("ChildSerializer")
//!     .field("name", CharField::new())
//!     .build();
//! let type_field = ParameterField::builder()
//!     .register("foo-type", child)
//!     .build()
//!     .unwrap();
//! let generic = GenericSerializer::builder("TypeFieldSerializer")
//!     .field("type", type_field)
//!     .build();
//!
//! let validated = generic
//!     .validate(&json!({"type": "foo-type", "name": "Foo Name"}))
//!     .unwrap();
//! assert_eq!(validated.to_value(), json!({"name": "Foo Name"}));
//! assert_eq!(
//!     generic.represent(&validated).unwrap(),
//!     json!({"type": "foo-type", "name": "Foo Name"})
//! );
//! ```

pub mod generic;
pub mod parameter;
pub mod resolver;
pub mod settings;
pub mod telemetry;

pub use generic::{GenericSerializer, GenericSerializerBuilder};
pub use parameter::{
    ParameterDictField, ParameterError, ParameterField, ParameterFieldBuilder, ParameterValidator,
    SerializerMaps,
};
pub use resolver::{lookup_serializer_parameters, resource_items, ResourceItem, RouteEntry, ViewSet};
pub use settings::ResolverSettings;
