use crate::{
    auth::Caller,
    error::AppError,
    models::{NewTask, TaskChanges, TaskChangesInput, TaskInput},
    routes::{expect_affected, parse_id, store_failure, DataResponse, MessageResponse},
    state::AppState,
    store::Owner,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::warn;

pub const CREATED: &str = "Tarefa criada com sucesso";
pub const UPDATED: &str = "Tarefa atualizada com sucesso";
pub const DELETED: &str = "Tarefa excluída com sucesso";
pub const NOT_FOUND: &str = "Tarefa não encontrada";
pub const CREATE_FAILED: &str = "Falha ao criar a tarefa";
pub const LIST_FAILED: &str = "Falha ao listar as tarefas";
pub const UPDATE_FAILED: &str = "Falha ao atualizar a tarefa";
pub const DELETE_FAILED: &str = "Falha ao excluir a tarefa";
pub const FORBIDDEN: &str = "Acesso negado à tarefa";

/// The owner to narrow task access to. Without ownership enforcement every
/// caller sees and mutates every task.
fn owner_scope(state: &AppState, caller: Caller) -> Owner {
    if state.policy.enforce_task_ownership {
        caller.0
    } else {
        None
    }
}

/// Rejects writes that would put a task under someone other than the caller.
fn check_assignee(owner: Owner, user_id: Option<i32>) -> Result<(), AppError> {
    match (owner, user_id) {
        (Some(owner), Some(user_id)) if owner != user_id => {
            warn!("User {} tried to assign a task to user {}", owner, user_id);
            Err(AppError::Forbidden(FORBIDDEN.into()))
        }
        _ => Ok(()),
    }
}

/// Lists all tasks across all owners (only the caller's when ownership is
/// enforced).
///
/// ## Responses:
/// - `200 OK`: `{"data": [Task, ...]}`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `500 Internal Server Error`: the store failed.
#[get("")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    caller: Caller,
) -> Result<impl Responder, AppError> {
    let tasks = state
        .store
        .list_tasks(owner_scope(&state, caller))
        .await
        .map_err(store_failure(LIST_FAILED))?;

    Ok(HttpResponse::Ok().json(DataResponse { data: tasks }))
}

/// Creates a task for the user named in the body.
///
/// The user is not looked up beforehand: an unknown `user_id` is rejected by
/// the store's foreign key and reported as a 500.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = NewTask::try_from(body.into_inner())?;
    check_assignee(owner_scope(&state, caller), Some(task.user_id))?;

    state
        .store
        .create_task(task)
        .await
        .map_err(store_failure(CREATE_FAILED))?;

    Ok(HttpResponse::Created().json(MessageResponse::new(CREATED)))
}

/// Updates any subset of a task's fields.
///
/// ## Responses:
/// - `200 OK`: at least one value changed.
/// - `403 Forbidden`: reassigning to another user while ownership is enforced.
/// - `404 Not Found`: no such task (or not the caller's), or nothing changed.
/// - `422 Unprocessable Entity`: a required field was sent as `null`.
/// - `500 Internal Server Error`: the store rejected the update.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
    body: web::Json<TaskChangesInput>,
) -> Result<impl Responder, AppError> {
    let id = parse_id(&path, NOT_FOUND)?;
    let changes = TaskChanges::try_from(body.into_inner())?;
    let owner = owner_scope(&state, caller);
    check_assignee(owner, changes.user_id)?;

    let rows = state
        .store
        .update_task(id, &changes, owner)
        .await
        .map_err(store_failure(UPDATE_FAILED))?;
    expect_affected(rows, NOT_FOUND)?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(UPDATED)))
}

#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_id(&path, NOT_FOUND)?;

    let rows = state
        .store
        .delete_task(id, owner_scope(&state, caller))
        .await
        .map_err(store_failure(DELETE_FAILED))?;
    expect_affected(rows, NOT_FOUND)?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(DELETED)))
}
