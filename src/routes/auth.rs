use crate::{
    auth::{TokenRequest, TokenResponse},
    error::AppError,
    routes::store_failure,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use log::error;
use validator::{Validate, ValidationErrors};

pub const INVALID_CREDENTIALS: &str = "Email ou senha inválidos";
pub const LOOKUP_FAILED: &str = "Falha ao buscar o usuário";
pub const SIGN_FAILED: &str = "Falha ao gerar o token";

/// Issue a token
///
/// Looks up a user whose email and password both match the body exactly and
/// returns a signed token valid for one hour.
///
/// ## Responses:
/// - `200 OK`: `{"token": "..."}`.
/// - `401 Unauthorized`: no user matches.
/// - `422 Unprocessable Entity`: `email` or `senha` missing.
/// - `500 Internal Server Error`: lookup or signing failed.
#[post("/token")]
pub async fn issue_token(
    state: web::Data<AppState>,
    body: web::Json<TokenRequest>,
) -> Result<impl Responder, AppError> {
    let body = body.into_inner();
    body.validate()?;
    let (Some(email), Some(senha)) = (body.email, body.senha) else {
        return Err(ValidationErrors::new().into());
    };

    let user = state
        .store
        .find_user_by_credentials(&email, &senha)
        .await
        .map_err(store_failure(LOOKUP_FAILED))?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    let token = state.tokens.issue(user.id_usuario).map_err(|e| {
        error!("{}: {}", SIGN_FAILED, e);
        AppError::InternalServerError(SIGN_FAILED.into())
    })?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
