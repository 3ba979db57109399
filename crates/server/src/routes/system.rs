use actix_web::{get, web, HttpResponse};
use chrono::Utc;

use crate::state::AppState;
use crate::types::HealthResponse;

/// GET /api/health
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        model: state.model_name.clone(),
        timestamp: Utc::now(),
    })
}
