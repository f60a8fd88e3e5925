use axum::{
    extract::rejection::JsonRejection,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use tracing::{debug, warn};

use wiretronic_utils::{ErrorResponse, WiretronicError};

/// HTTP face of [`WiretronicError`]: `{error, code}` with the error's status.
#[derive(Debug)]
pub struct ApiError(pub WiretronicError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<WiretronicError> for ApiError {
    fn from(error: WiretronicError) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(WiretronicError::validation("body", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

pub async fn error_logging_middleware(request: Request<axum::body::Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status();
    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), "Request failed");
    } else if status.is_client_error() {
        debug!(%method, %path, status = status.as_u16(), "Request rejected");
    }

    response
}
