//! Serializable renderings of validation errors.

use crate::core::ValidationKind;
use crate::errors::{AggregatedValidationError, PathSegment, SchemaValidationError, ValidateError};
use serde::Serialize;

/// One issue, ready for a response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedIssue {
    /// Steps to the offending field.
    pub path: Vec<PathSegment>,
    /// Human-readable description.
    pub message: String,
    /// Machine-readable code.
    pub code: String,
}

/// A single schema error, ready for a response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedSchemaError {
    /// Summary message.
    pub message: String,
    /// Every issue in order.
    pub issues: Vec<FormattedIssue>,
}

/// An aggregated error, ready for a response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedAggregatedError {
    /// Summary message.
    pub message: String,
    /// The failing phase.
    pub kind: ValidationKind,
    /// Every underlying error in order.
    pub errors: Vec<FormattedSchemaError>,
}

/// Formats a single schema error.
#[must_use]
pub fn format_schema_error(err: &SchemaValidationError) -> FormattedSchemaError {
    FormattedSchemaError {
        message: err.to_string(),
        issues: err
            .issues()
            .iter()
            .map(|issue| FormattedIssue {
                path: issue.path.clone(),
                message: issue.message.clone(),
                code: issue.code.clone(),
            })
            .collect(),
    }
}

/// Formats an aggregated error.
#[must_use]
pub fn format_aggregated_error(err: &AggregatedValidationError) -> FormattedAggregatedError {
    FormattedAggregatedError {
        message: err.to_string(),
        kind: err.kind,
        errors: err.errors.iter().map(format_schema_error).collect(),
    }
}

/// Either formatted shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FormattedError {
    /// A single schema error.
    Schema(FormattedSchemaError),
    /// An aggregated error.
    Aggregated(FormattedAggregatedError),
}

/// Formats a validation failure; other errors yield `None`.
#[must_use]
pub fn format_validate_error(err: &ValidateError) -> Option<FormattedError> {
    match err {
        ValidateError::Schema(err) => Some(FormattedError::Schema(format_schema_error(err))),
        ValidateError::Aggregated(err) => {
            Some(FormattedError::Aggregated(format_aggregated_error(err)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Issue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn address_error() -> SchemaValidationError {
        SchemaValidationError::new(vec![
            Issue::new("invalid_type", "Required").at(["address", "country"]),
            Issue::new("too_small", "Too short").at([PathSegment::from("tags"), PathSegment::from(0)]),
        ])
    }

    #[test]
    fn test_format_schema_error() {
        let formatted = format_schema_error(&address_error());
        assert_eq!(
            serde_json::to_value(&formatted).unwrap(),
            json!({
                "message": "Schema validation failed: address.country: Required (invalid_type); tags[0]: Too short (too_small)",
                "issues": [
                    {"path": ["address", "country"], "message": "Required", "code": "invalid_type"},
                    {"path": ["tags", 0], "message": "Too short", "code": "too_small"}
                ]
            })
        );
    }

    #[test]
    fn test_format_aggregated_error() {
        let err = AggregatedValidationError::new(
            vec![address_error(), SchemaValidationError::single(Issue::new("custom", "No"))],
            ValidationKind::Input,
        );
        let json = serde_json::to_value(format_aggregated_error(&err)).unwrap();
        assert_eq!(json["message"], "Validation failed for input with 2 error(s).");
        assert_eq!(json["kind"], "input");
        assert_eq!(json["errors"].as_array().unwrap().len(), 2);
        assert_eq!(json["errors"][1]["issues"][0]["path"], json!([]));
    }

    #[test]
    fn test_format_validate_error_ignores_foreign_errors() {
        let method_err = ValidateError::Method(anyhow::anyhow!("boom"));
        assert!(format_validate_error(&method_err).is_none());

        let schema_err = ValidateError::from(address_error());
        assert!(matches!(
            format_validate_error(&schema_err),
            Some(FormattedError::Schema(_))
        ));
    }
}
