pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;
use log::{error, warn};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::store::StoreError;

/// Registers every route. Protection is applied by wrapping the app in
/// `AuthMiddleware`, which knows which of these routes are public.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(health::health)
        .service(auth::issue_token)
        .service(
            web::scope("/usuarios")
                .service(users::create_user)
                .service(users::list_users)
                .service(users::update_user)
                .service(users::delete_user),
        )
        .service(
            web::scope("/tarefas")
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}

pub const INVALID_BODY: &str = "Corpo da requisição inválido";

/// Body parse failures become `{"error": ...}` responses like every other
/// failure. Bodies are read as JSON whatever the content type says. The parser
/// detail is only logged.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err, req| {
            warn!("{} {}: {}: {}", req.method(), req.path(), INVALID_BODY, err);
            AppError::BadRequest(INVALID_BODY.into()).into()
        })
}

/// `{"message": ...}` confirmation body for create, update and delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// `{"data": [...]}` body for the list routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: Vec<T>,
}

/// Logs a store failure and turns it into the route's fixed 500 message.
/// Every handler maps store errors through here.
pub(crate) fn store_failure(message: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |err| {
        error!("{}: {}", message, err);
        AppError::DatabaseError(message.to_string())
    }
}

/// Zero affected rows means the target was not found (or nothing changed).
pub(crate) fn expect_affected(rows: u64, not_found: &str) -> Result<(), AppError> {
    if rows == 0 {
        return Err(AppError::NotFound(not_found.to_string()));
    }
    Ok(())
}

/// A path id that is not a number cannot match any row.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::NotFound(not_found.to_string()))
}
