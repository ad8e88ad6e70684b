//! # Parameterized Serializers Sample
//!
//! A small application exercising serializer discovery and dispatch: two
//! models, the views serving them, a routing table, and generic serializers
//! resolving against it. Exposed as a library for integration testing.

pub mod model;
pub mod serializers;
pub mod urls;
pub mod viewsets;
