//! # Parameterized Serializers Sample
//!
//! Walks through one validation and one rendering pass of a generic
//! serializer whose specific serializers are discovered from the sample
//! routing table:
//!
//! 1. Validating `{"type": "people", ...}` delegates to the `people` view's
//!    serializer.
//! 2. Rendering a [`Person`] infers `"type": "people"` from its model.
//!
//! Run with `RUST_LOG=debug` to see each resolution.

use parameterized_serializers::telemetry::setup_tracing;
use serde_json::json;
use serializer_sample::model::Person;
use serializer_sample::serializers::example_discovered_type_serializer;
use tracing::{error, info};

fn main() -> Result<(), String> {
    setup_tracing();

    info!("Starting parameterized serializers sample");

    let serializer = example_discovered_type_serializer().map_err(|e| e.to_string())?;

    let payload = json!({"type": "people", "id": 1, "name": "Alice"});
    let validated = serializer.validate(&payload).map_err(|e| e.to_string())?;
    info!(validated = %validated.to_value(), "Validated person payload");

    let alice = Person::new(1, "Alice").to_native().map_err(|e| e.to_string())?;
    let rendered = serializer.represent(&alice).map_err(|e| e.to_string())?;
    info!(%rendered, "Rendered person");

    match serializer.validate(&json!({"type": "robots", "name": "R2"})) {
        Ok(value) => info!(validated = %value.to_value(), "Unexpectedly validated robot"),
        Err(err) => error!(error = %err, "Unknown parameter rejected"),
    }

    info!("Sample completed successfully");
    Ok(())
}
