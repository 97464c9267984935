use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use log::warn;
use serde_json::json;

use crate::state::AppState;

/// Health check endpoint
///
/// Reports whether the store answers, with the current timestamp.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    match state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "timestamp": Utc::now()
        })),
        Err(e) => {
            warn!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unavailable",
                "timestamp": Utc::now()
            }))
        }
    }
}
