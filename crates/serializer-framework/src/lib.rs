//! # Serializer Framework
//!
//! The schema machinery the parameterized serializers are built on. It converts
//! between **primitive data** (`serde_json::Value`, what travels over the wire)
//! and **native values** ([`Native`], what the application works with), and
//! reports problems as structured [`ValidationError`] trees.
//!
//! ## Architecture Overview
//!
//! 1. **Values** ([`native`]) - native values, model records and validated data
//! 2. **Fields** ([`field`], [`fields`]) - the [`Field`] contract and scalar kinds
//! 3. **Serializers** ([`serializer`]) - ordered field sets, nestable as fields
//! 4. **Composition** ([`composite`], [`unhandled`]) - list/dict fields of
//!    serializers and capture of undeclared input keys
//!
//! ## Passes and Context
//!
//! Every validation or representation is a *pass* that threads a [`Context`]
//! through all field hooks. Serializers are immutable once built and can be
//! shared across threads; all per-pass decisions live in the context. In
//! particular, a **composite** serializer delegates to a child that is resolved
//! during the pass and published into the context through its [`ChildSlot`].
//!
//! ```rust
//! use serializer_framework::{CharField, Serializer, SerializerListField};
//! use serde_json::json;
//!
//! let child = Serializer::builder("ChildSerializer")
//!     .field("name", CharField::new())
//!     .build();
//! let parent = Serializer::builder("ListSerializer")
//!     .field("children", SerializerListField::new(child).allow_empty(false))
//!     .build();
//!
//! let data = json!({"children": [{"name": "Foo Name"}]});
//! let validated = parent.validate(&data).unwrap();
//! assert_eq!(parent.represent(&validated).unwrap(), data);
//! ```

pub mod composite;
pub mod context;
pub mod error;
pub mod field;
pub mod fields;
pub mod native;
pub mod serializer;
pub mod unhandled;

pub use composite::{SerializerDictField, SerializerListField};
pub use context::{ChildSlot, Context};
pub use error::{
    AttributeError, ErrorDetail, ErrorMessage, FieldError, MissingAttribute, MissingKind,
    ValidationError, NON_FIELD_ERRORS,
};
pub use field::{default_attribute, Field, FieldBuilder, FieldOptions, Validator};
pub use fields::{BooleanField, CharField, IntegerField, UnvalidatedField};
pub use native::{DataType, Model, Native, Record, Validated};
pub use serializer::{CloneMeta, Composite, CompositeHooks, Meta, Serializer, SerializerBuilder};
pub use unhandled::{UnhandledChild, UnhandledConflict, UnhandledOptions};
