//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used by every handler.
//! Each variant carries the human-readable message that ends up in the
//! `{"error": ...}` body, so the status code and payload for a failure are
//! decided in exactly one place.
//!
//! `AppError` implements `actix_web::error::ResponseError`, which lets handlers
//! and the auth middleware return it directly.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::warn;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can reach a client.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid token, or credentials that match no user (HTTP 401).
    Unauthorized(String),
    /// Caller is authenticated but may not touch the resource (HTTP 403).
    /// Only produced when task ownership is enforced.
    Forbidden(String),
    /// The addressed record does not exist, or the mutation changed no row (HTTP 404).
    NotFound(String),
    /// The request body could not be parsed (HTTP 400).
    BadRequest(String),
    /// A required field is absent from the request body (HTTP 422).
    ValidationError(String),
    /// Unexpected server-side failure outside the store, e.g. token signing (HTTP 500).
    InternalServerError(String),
    /// The data store rejected or failed the operation (HTTP 500).
    DatabaseError(String),
}

impl AppError {
    fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::ValidationError(msg)
            | AppError::InternalServerError(msg)
            | AppError::DatabaseError(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.message()
        }))
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// Only presence is validated, so the message lists the absent fields in a
/// stable order.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
        fields.sort_unstable();
        let message = format!("Campos obrigatórios ausentes: {}", fields.join(", "));
        warn!("{}", message);
        AppError::ValidationError(message)
    }
}
