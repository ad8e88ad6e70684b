use std::any::Any;

use serializer_framework::{Context, FieldError, Native, Validator};
use tracing::warn;

use super::error::parameter_text;
use super::field::ParameterField;

/// Resolves the specific serializer for a validated parameter, then omits the
/// parameter from validated data unless the field retains it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterValidator;

impl Validator for ParameterValidator {
    fn validate(&self, value: &Native, field: &dyn Any, ctx: &mut Context) -> Result<(), FieldError> {
        let Some(field) = field.downcast_ref::<ParameterField>() else {
            warn!("Parameter validator attached to a field that is not a parameter field");
            return Ok(());
        };
        field.lookup_schema(&parameter_text(value), ctx)?;
        if field.skip() {
            return Err(FieldError::Skip);
        }
        Ok(())
    }
}
