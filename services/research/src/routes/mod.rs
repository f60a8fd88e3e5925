use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers::*, AppState};

pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/research", post(research))
        .route("/research/text", post(research_text))
        .route("/parse", post(parse_items))
        .route("/fx/:currency", get(rate_to_sek))
        .route("/health/detailed", get(detailed_health_check))
}
