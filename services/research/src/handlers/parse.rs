use axum::{extract::rejection::JsonRejection, response::Json};

use wiretronic_models::{ParseRequest, ParseResponse};
use wiretronic_utils::parse_lines;

use crate::middleware::ApiResult;

/// Split order lines into part numbers and quantities
///
/// POST /api/v1/parse
pub async fn parse_items(body: Result<Json<ParseRequest>, JsonRejection>) -> ApiResult<Json<ParseResponse>> {
    let Json(request) = body?;
    Ok(Json(ParseResponse {
        items: parse_lines(&request.text),
    }))
}
