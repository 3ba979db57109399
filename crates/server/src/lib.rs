//! LegalAssist HTTP Server
//!
//! Actix-web REST API over the feature router

pub mod extract;
pub mod router;
pub mod routes;
pub mod state;
pub mod types;

use actix_cors::Cors;
use actix_web::{error::InternalError, web, App, HttpResponse, HttpServer};
use legalassist_common::{AppConfig, Result};
use legalassist_llm::ModelGateway;
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use router::{Feature, FeatureRouter};
pub use state::AppState;
pub use types::{ChatRequest, ChatResponse, ErrorResponse};

/// JSON body settings: large enough for pasted documents, errors as `{error}`
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(ErrorResponse::new(err.to_string()));
            InternalError::from_response(err, response).into()
        })
}

fn cors(config: &AppConfig) -> Cors {
    if config.cors_allow_any_origin {
        Cors::permissive()
    } else {
        Cors::default()
    }
}

/// Start the HTTP server and run until shutdown
pub async fn start_server(config: AppConfig, gateway: Arc<dyn ModelGateway>) -> Result<()> {
    let bind_address = config.server_bind_address();
    let state = web::Data::new(AppState::new(config, gateway)?);

    info!(
        "Starting server on {} (model: {}, single-shot threshold: {} chars)",
        bind_address, state.model_name, state.config.analysis.single_shot_threshold
    );

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors(&state.config))
            .app_data(state.clone())
            .app_data(json_config(state.config.max_upload_bytes))
            .configure(routes::configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
