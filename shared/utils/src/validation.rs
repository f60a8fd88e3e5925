use crate::error::{WiretronicError, WiretronicResult};
use validator::{Validate, ValidationErrors};

pub fn validate_model<T: Validate>(model: &T) -> WiretronicResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(WiretronicError::validation(
            first_invalid_field(&errors),
            format_validation_errors(&errors),
        )),
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match (&error.message, error.code.as_ref()) {
                (Some(message), _) => message.to_string(),
                (None, "length") => format!("Length validation failed for field '{}'", field),
                (None, "range") => format!("Value out of range for field '{}'", field),
                (None, "required") => format!("Field '{}' is required", field),
                (None, code) => format!("Validation failed for field '{}': {}", field, code),
            };
            messages.push(message);
        }
    }

    messages.sort();
    messages.join(", ")
}

fn first_invalid_field(errors: &ValidationErrors) -> String {
    let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
    fields.sort_unstable();
    fields.first().map(|field| field.to_string()).unwrap_or_else(|| "model".to_string())
}

/// Picks the credential for an upstream call: the caller's key wins over
/// the configured one. Blank keys count as missing.
pub fn resolve_api_key(request_key: Option<&str>, configured_key: Option<&str>) -> WiretronicResult<String> {
    request_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .or_else(|| configured_key.map(str::trim).filter(|key| !key.is_empty()))
        .map(str::to_string)
        .ok_or_else(|| WiretronicError::authentication("Missing OpenAI API key"))
}
