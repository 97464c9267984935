//! Data-access boundary.
//!
//! Handlers reach the database only through the [`Store`] trait. Every call is
//! a single operation returning a [`StoreResult`]; mutations report how many
//! rows actually changed so callers can tell "nothing matched" apart from
//! "the operation failed".

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::{NewTask, NewUser, Task, TaskChanges, User, UserChanges};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A schema constraint rejected the write (foreign key, column length).
    #[error("constraint violated: {0}")]
    Constraint(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Narrows task operations to one owner. `None` means every task is visible
/// and mutable, which is the default behaviour.
pub type Owner = Option<i32>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Exact match on both fields, no normalisation.
    async fn find_user_by_credentials(&self, email: &str, senha: &str)
        -> StoreResult<Option<User>>;

    async fn update_user(&self, id: i32, changes: &UserChanges) -> StoreResult<u64>;

    /// With `cascade`, the user's tasks are deleted first in the same
    /// transaction. Without it, tasks still referencing the user make the
    /// delete fail on the foreign key.
    async fn delete_user(&self, id: i32, cascade: bool) -> StoreResult<u64>;

    async fn create_task(&self, task: NewTask) -> StoreResult<Task>;

    async fn list_tasks(&self, owner: Owner) -> StoreResult<Vec<Task>>;

    async fn update_task(&self, id: i32, changes: &TaskChanges, owner: Owner)
        -> StoreResult<u64>;

    async fn delete_task(&self, id: i32, owner: Owner) -> StoreResult<u64>;

    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> StoreResult<()>;
}
