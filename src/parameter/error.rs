use serializer_framework::{FieldError, Native, ValidationError};

/// A parameter and a specific serializer could not be matched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    #[error("No specific serializer available for parameter {parameter:?}")]
    UnknownParameter { parameter: String },
    #[error("No parameter found for the specific serializer, {serializer}")]
    SerializerNotRegistered { serializer: String },
    #[error("The parameter, {parameter:?}, does not match the looked up parameter, {by_type:?}")]
    ParameterMismatch { parameter: String, by_type: String },
    #[error("Could not lookup parameter from {instance}")]
    InstanceNotRegistered { instance: String },
}

impl ParameterError {
    pub fn code(&self) -> &'static str {
        match self {
            ParameterError::UnknownParameter { .. } => "unknown",
            ParameterError::SerializerNotRegistered { .. } => "serializer",
            ParameterError::ParameterMismatch { .. } => "mismatch",
            ParameterError::InstanceNotRegistered { .. } => "instance",
        }
    }

    pub(crate) fn instance(instance: &Native) -> Self {
        ParameterError::InstanceNotRegistered {
            instance: describe_instance(instance),
        }
    }
}

impl From<ParameterError> for ValidationError {
    fn from(err: ParameterError) -> Self {
        ValidationError::new(err.to_string(), err.code())
    }
}

impl From<ParameterError> for FieldError {
    fn from(err: ParameterError) -> Self {
        FieldError::Validation(err.into())
    }
}

/// A parameter field was configured without any source of serializers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Must give at least one of `urlconf`, `specific_serializers` or `specific_serializers_by_type`")]
pub struct MissingSerializerSource;

fn describe_instance(instance: &Native) -> String {
    match instance {
        Native::Record(record) => format!("<{} object>", record.data_type().name()),
        Native::Validated(validated) => {
            format!("<{} data {}>", validated.serializer().name(), instance.to_value())
        }
        other => other.to_value().to_string(),
    }
}

/// The text of a parameter value.
pub(crate) fn parameter_text(value: &Native) -> String {
    match value.as_str() {
        Some(text) => text.to_string(),
        None => value.to_value().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn errors_convert_with_their_codes() {
        let err = ValidationError::from(ParameterError::UnknownParameter {
            parameter: "nope".into(),
        });
        assert_eq!(err.code(), Some("unknown"));
        assert_eq!(
            err.detail().messages()[0].message,
            "No specific serializer available for parameter \"nope\""
        );

        let err = ParameterError::ParameterMismatch {
            parameter: "people".into(),
            by_type: "types".into(),
        };
        assert_eq!(err.code(), "mismatch");
        assert!(err.to_string().contains("\"people\""));
    }

    #[test]
    fn parameter_text_is_the_raw_string() {
        assert_eq!(parameter_text(&Native::from("people")), "people");
        assert_eq!(parameter_text(&Native::from(json!(3))), "3");
    }
}
