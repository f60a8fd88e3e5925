use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::AppState;

/// Liveness plus an exchange-rate probe. Missing rates degrade the
/// service; research still runs with unpriced offers.
pub async fn detailed_health_check(State(state): State<AppState>) -> Json<Value> {
    let mut health_status = json!({
        "status": "healthy",
        "service": "wiretronic-research",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {}
    });

    health_status["checks"]["exchangeRates"] = match state.rates.rate_to_sek("EUR").await {
        Some(rate) => json!({"status": "healthy", "message": format!("EUR/SEK {:.4}", rate)}),
        None => json!({"status": "unhealthy", "message": "No exchange rates available"}),
    };

    health_status["checks"]["openai"] = match state.config.openai.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => json!({"status": "healthy", "message": "Server key configured"}),
        _ => json!({"status": "healthy", "message": "Requests must supply an API key"}),
    };

    let all_healthy = health_status["checks"]
        .as_object()
        .map(|checks| checks.values().all(|check| check["status"] == "healthy"))
        .unwrap_or(true);

    if !all_healthy {
        health_status["status"] = json!("degraded");
    }

    Json(health_status)
}
