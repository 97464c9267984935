use crate::{
    error::AppError,
    models::{NewUser, UserChanges, UserChangesInput, UserInput},
    routes::{expect_affected, parse_id, store_failure, DataResponse, MessageResponse},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

pub const CREATED: &str = "Usuário criado com sucesso";
pub const UPDATED: &str = "Usuário atualizado com sucesso";
pub const DELETED: &str = "Usuário excluído com sucesso";
pub const NOT_FOUND: &str = "Usuário não encontrado";
pub const CREATE_FAILED: &str = "Falha ao criar o usuário";
pub const LIST_FAILED: &str = "Falha ao listar os usuários";
pub const UPDATE_FAILED: &str = "Falha ao atualizar o usuário";
pub const DELETE_FAILED: &str = "Falha ao excluir o usuário";

/// Registers a user. Public: no token required, no duplicate check.
#[post("")]
pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    let user = NewUser::try_from(body.into_inner())?;

    state
        .store
        .create_user(user)
        .await
        .map_err(store_failure(CREATE_FAILED))?;

    Ok(HttpResponse::Created().json(MessageResponse::new(CREATED)))
}

/// Lists every user, credentials included, without paging.
#[get("")]
pub async fn list_users(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let users = state
        .store
        .list_users()
        .await
        .map_err(store_failure(LIST_FAILED))?;

    Ok(HttpResponse::Ok().json(DataResponse { data: users }))
}

/// Updates any subset of a user's fields.
///
/// ## Responses:
/// - `200 OK`: at least one value changed.
/// - `404 Not Found`: no such user, or the body changes nothing.
/// - `422 Unprocessable Entity`: a field was sent as `null`.
/// - `500 Internal Server Error`: the store rejected the update.
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UserChangesInput>,
) -> Result<impl Responder, AppError> {
    let id = parse_id(&path, NOT_FOUND)?;
    let changes = UserChanges::try_from(body.into_inner())?;

    let rows = state
        .store
        .update_user(id, &changes)
        .await
        .map_err(store_failure(UPDATE_FAILED))?;
    expect_affected(rows, NOT_FOUND)?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(UPDATED)))
}

/// Deletes a user. Their tasks are only removed as well when cascading is
/// enabled; otherwise the foreign key makes the delete fail while tasks remain.
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_id(&path, NOT_FOUND)?;

    let rows = state
        .store
        .delete_user(id, state.policy.cascade_user_delete)
        .await
        .map_err(store_failure(DELETE_FAILED))?;
    expect_affected(rows, NOT_FOUND)?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(DELETED)))
}
