use actix_web::{web, HttpResponse, Responder};
use log::{debug, error, info};
use serde_json::json;

use crate::prompt;
use crate::web::error::RelayError;
use crate::web::models::{ChatRequest, ChatResponse};
use crate::AppState;

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Chat API endpoint: one history + message in, one reply out
pub async fn chat(
    data: web::Data<AppState>,
    body: Result<web::Bytes, actix_web::Error>,
) -> Result<HttpResponse, RelayError> {
    let body = body.map_err(|e| {
        debug!("Rejected chat request body: {}", e);
        RelayError::from(e)
    })?;

    let request = match ChatRequest::from_body(&body) {
        Ok(request) => request,
        Err(RelayError::MissingMessage) => {
            debug!("Rejected chat request without a usable message");
            return Err(RelayError::MissingMessage);
        }
        Err(e) => {
            error!("Failed to assemble chat context: {:?}", e);
            return Err(e);
        }
    };

    info!(
        "Chat request: {} history turns, message of {} characters",
        request.history.len(),
        request.message.chars().count()
    );

    let contents = prompt::build_context(&data.prompt.system_instruction, &request);

    match data.generator.generate(&contents, &data.prompt.generation).await {
        Ok(reply) => Ok(HttpResponse::Ok().json(ChatResponse { reply })),
        Err(e) => {
            error!("Gemini call failed: {:?}", e);
            Err(RelayError::Upstream(e))
        }
    }
}
