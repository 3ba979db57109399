pub mod chat;
pub mod system;
pub mod upload;

use actix_web::web;

/// Register every API route under `/api`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(chat::chat)
            .service(upload::analyze_file)
            .service(system::health),
    );
}
