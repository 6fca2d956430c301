use actix_web::web;

use crate::web::handlers;

/// API routes. Static files are mounted separately and must come after these.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api").service(web::resource("/chat").route(web::post().to(handlers::chat))),
    )
    .service(web::resource("/health").route(web::get().to(handlers::health_check)));
}
