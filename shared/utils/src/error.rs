use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WiretronicError {
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Malformed upstream response: {message}")]
    MalformedResponse { message: String },

    #[error("Exchange rate error: {source_name} - {message}")]
    ExchangeRate { source_name: String, message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl WiretronicError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }

    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn exchange_rate(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExchangeRate {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::Timeout { .. } => "TIMEOUT",
            Self::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            Self::ExchangeRate { .. } => "EXCHANGE_RATE_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::Authentication { .. } => 400,
            Self::Configuration { .. } => 500,
            Self::Upstream { .. } => 502,
            Self::Transport { .. } => 502,
            Self::Timeout { .. } => 504,
            Self::MalformedResponse { .. } => 502,
            Self::ExchangeRate { .. } => 502,
            Self::Internal { .. } => 500,
        }
    }

    /// Server-side and rate-limit responses plus transport failures are
    /// worth one more attempt. Everything else is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream { status, .. } => *status >= 500 || *status == 429,
            Self::Transport { .. } => true,
            _ => false,
        }
    }
}

pub type WiretronicResult<T> = Result<T, WiretronicError>;

/// JSON error body returned by the HTTP API.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<WiretronicError> for ErrorResponse {
    fn from(error: WiretronicError) -> Self {
        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
        }
    }
}

impl From<reqwest::Error> for WiretronicError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return Self::malformed_response(error.to_string());
        }
        match error.status() {
            Some(status) => Self::upstream(status.as_u16(), error.to_string()),
            None => Self::transport(error.to_string()),
        }
    }
}

impl From<serde_json::Error> for WiretronicError {
    fn from(error: serde_json::Error) -> Self {
        Self::malformed_response(error.to_string())
    }
}
