use actix_web::{http::StatusCode, post, web, HttpResponse};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::state::AppState;
use crate::types::{ChatRequest, ErrorResponse};

/// POST /api/chat - consult, analyze or generate-template
#[post("/chat")]
pub async fn chat(
    req: web::Json<ChatRequest>,
    state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    let req = req.into_inner();
    let span = info_span!(
        "chat",
        request_id = %Uuid::new_v4(),
        feature = req.feature.as_deref().unwrap_or("consult")
    );

    let result = state
        .router
        .handle(req.message.as_deref(), req.feature.as_deref())
        .instrument(span)
        .await;

    Ok(match result {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => HttpResponse::build(
            StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_REQUEST),
        )
        .json(ErrorResponse::new(e.to_string())),
    })
}
