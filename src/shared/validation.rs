//! Validation Utilities

use validator::ValidationErrors;

/// Flatten validation errors into a single `field: message` line.
///
/// Only the first field error is reported; clients get one actionable
/// message rather than the whole error tree.
pub fn first_error_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, message)
            })
        })
        .next()
        .unwrap_or_else(|| "Validation failed".into())
}
