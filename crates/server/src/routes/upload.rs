use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use futures_util::StreamExt;
use legalassist_llm::Document;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::extract::{decode_text, is_plain_text, ExtractError};
use crate::state::AppState;
use crate::types::ErrorResponse;

/// POST /api/analyze-file - analyze an uploaded plain-text document
#[post("/analyze-file")]
pub async fn analyze_file(
    mut payload: Multipart,
    state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    let limit = state.config.max_upload_bytes;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = payload.next().await {
        let mut field = field?;
        let content_disposition = field.content_disposition();

        if content_disposition.get_name() != Some("file") {
            continue;
        }

        let filename = content_disposition
            .get_filename()
            .unwrap_or("upload.txt")
            .to_string();
        let content_type = field.content_type().map(|m| m.to_string());

        if !is_plain_text(&filename, content_type.as_deref()) {
            warn!("Rejected upload {} ({:?})", filename, content_type);
            return Ok(extract_error(ExtractError::Unsupported(filename)));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            if bytes.len() + data.len() > limit {
                return Ok(extract_error(ExtractError::TooLarge { limit }));
            }
            bytes.extend_from_slice(&data);
        }

        upload = Some((filename, bytes));
    }

    let Some((filename, bytes)) = upload else {
        return Ok(extract_error(ExtractError::NoFile));
    };

    info!("Received {} ({} bytes) for analysis", filename, bytes.len());
    let document = Document::from_file(decode_text(&bytes), filename);

    let result = state
        .router
        .handle_document(document)
        .instrument(info_span!("analyze_file", request_id = %Uuid::new_v4()))
        .await;

    Ok(match result {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string())),
    })
}

fn extract_error(error: ExtractError) -> HttpResponse {
    let body = ErrorResponse::new(error.to_string());
    match error {
        ExtractError::NoFile => HttpResponse::BadRequest().json(body),
        ExtractError::Unsupported(_) => HttpResponse::UnsupportedMediaType().json(body),
        ExtractError::TooLarge { .. } => HttpResponse::PayloadTooLarge().json(body),
    }
}
