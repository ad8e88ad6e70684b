//! # Observability
//!
//! Resolution is traced with the `tracing` crate:
//!
//! - **INFO** - serializer maps built for a parameter field
//! - **DEBUG** - parameters resolved per pass, views without querysets
//! - **TRACE** - every discovered route, delegation to specific serializers
//! - **WARN** - binding problems such as a missing sibling parameter field
//!
//! ```bash
//! # Show each resolution
//! RUST_LOG=debug cargo run -p serializer-sample
//!
//! # Only this crate, very verbose
//! RUST_LOG=parameterized_serializers=trace cargo run -p serializer-sample
//! ```

/// Installs a compact subscriber filtered by `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
