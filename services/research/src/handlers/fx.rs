use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateResponse {
    pub currency: String,
    /// `null` when no rate is available.
    pub rate_to_sek: Option<f64>,
}

/// GET /api/v1/fx/:currency
pub async fn rate_to_sek(State(state): State<AppState>, Path(currency): Path<String>) -> Json<RateResponse> {
    let currency = currency.trim().to_uppercase();
    let rate = state.rates.rate_to_sek(&currency).await;

    Json(RateResponse {
        currency,
        rate_to_sek: rate,
    })
}
