#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use agenda::auth::AuthMiddleware;
use agenda::config::AccessPolicy;
use agenda::models::{NewTask, NewUser, Task, TaskChanges, User, UserChanges};
use agenda::routes;
use agenda::state::AppState;
use agenda::store::{MemoryStore, Owner, Store, StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::{json, Value};

pub const SECRET: &str = "test-secret";

pub fn memory_state(policy: AccessPolicy) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), Some(SECRET.to_string()), policy);
    (state, store)
}

pub async fn init_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(AuthMiddleware)
            .configure(routes::config),
    )
    .await
}

/// Sends a request and returns the status with the JSON body (`Null` when
/// the body is empty or not JSON).
pub async fn send<S, B>(app: &S, req: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub fn with_token(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.insert_header(("Authorization", token.to_string()))
}

pub async fn register<S, B>(app: &S, nome: &str, email: &str, senha: &str) -> StatusCode
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/usuarios")
        .set_json(json!({ "nome": nome, "email": email, "senha": senha }));
    send(app, req).await.0
}

pub async fn login<S, B>(app: &S, email: &str, senha: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/token")
        .set_json(json!({ "email": email, "senha": senha }));
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"]
        .as_str()
        .expect("token missing from response")
        .to_string()
}

/// Registers a user and returns a token for them.
pub async fn register_and_login<S, B>(app: &S, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    assert_eq!(register(app, "Teste", email, "pw").await, StatusCode::CREATED);
    login(app, email, "pw").await
}

/// A store whose every call fails, as if the database were unreachable.
pub struct FailingStore;

fn unavailable<T>() -> StoreResult<T> {
    Err(StoreError::Database(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl Store for FailingStore {
    async fn create_user(&self, _user: NewUser) -> StoreResult<User> {
        unavailable()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        unavailable()
    }

    async fn find_user_by_credentials(
        &self,
        _email: &str,
        _senha: &str,
    ) -> StoreResult<Option<User>> {
        unavailable()
    }

    async fn update_user(&self, _id: i32, _changes: &UserChanges) -> StoreResult<u64> {
        unavailable()
    }

    async fn delete_user(&self, _id: i32, _cascade: bool) -> StoreResult<u64> {
        unavailable()
    }

    async fn create_task(&self, _task: NewTask) -> StoreResult<Task> {
        unavailable()
    }

    async fn list_tasks(&self, _owner: Owner) -> StoreResult<Vec<Task>> {
        unavailable()
    }

    async fn update_task(
        &self,
        _id: i32,
        _changes: &TaskChanges,
        _owner: Owner,
    ) -> StoreResult<u64> {
        unavailable()
    }

    async fn delete_task(&self, _id: i32, _owner: Owner) -> StoreResult<u64> {
        unavailable()
    }

    async fn ping(&self) -> StoreResult<()> {
        unavailable()
    }
}
