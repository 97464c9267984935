use async_trait::async_trait;
use log::info;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{Owner, Store, StoreResult};
use crate::config::DatabaseConfig;
use crate::models::{NewTask, NewUser, Task, TaskChanges, User, UserChanges};

const USER_COLUMNS: &str = "id_usuario, nome, email, senha";
const TASK_COLUMNS: &str = "id, titulo, descricao, data_realizacao, user_id";

/// `Store` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the pool. No TLS and no retry: if the database is unreachable
    /// the error goes straight back to the caller.
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options()?)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the SQL files under `migrations/`.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database schema is up to date");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO usuarios (nome, email, senha) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user.nome)
        .bind(user.email)
        .bind(user.senha)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM usuarios ORDER BY id_usuario",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn find_user_by_credentials(
        &self,
        email: &str,
        senha: &str,
    ) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM usuarios WHERE email = $1 AND senha = $2 ORDER BY id_usuario LIMIT 1",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(senha)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user(&self, id: i32, changes: &UserChanges) -> StoreResult<u64> {
        // Rows whose values would not change are excluded, so the affected
        // count only covers real changes.
        let result = sqlx::query(
            "UPDATE usuarios
             SET nome = COALESCE($1, nome), email = COALESCE($2, email), senha = COALESCE($3, senha)
             WHERE id_usuario = $4
               AND (nome, email, senha) IS DISTINCT FROM
                   (COALESCE($1, nome), COALESCE($2, email), COALESCE($3, senha))",
        )
        .bind(changes.nome.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.senha.as_deref())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_user(&self, id: i32, cascade: bool) -> StoreResult<u64> {
        if !cascade {
            let result = sqlx::query("DELETE FROM usuarios WHERE id_usuario = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            return Ok(result.rows_affected());
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM tarefas WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM usuarios WHERE id_usuario = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<Task> {
        let created = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tarefas (titulo, descricao, data_realizacao, user_id)
             VALUES ($1, $2, $3, $4) RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(task.titulo)
        .bind(task.descricao)
        .bind(task.data_realizacao)
        .bind(task.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_tasks(&self, owner: Owner) -> StoreResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tarefas WHERE ($1::INT IS NULL OR user_id = $1) ORDER BY id",
            TASK_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn update_task(&self, id: i32, changes: &TaskChanges, owner: Owner) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE tarefas
             SET titulo = COALESCE($1::VARCHAR, titulo),
                 descricao = COALESCE($2::VARCHAR, descricao),
                 data_realizacao = CASE WHEN $3::BOOLEAN THEN $4::TIMESTAMPTZ ELSE data_realizacao END,
                 user_id = COALESCE($5::INT, user_id)
             WHERE id = $6
               AND ($7::INT IS NULL OR user_id = $7)
               AND (titulo, descricao, data_realizacao, user_id) IS DISTINCT FROM
                   (COALESCE($1::VARCHAR, titulo),
                    COALESCE($2::VARCHAR, descricao),
                    CASE WHEN $3::BOOLEAN THEN $4::TIMESTAMPTZ ELSE data_realizacao END,
                    COALESCE($5::INT, user_id))",
        )
        .bind(changes.titulo.as_deref())
        .bind(changes.descricao.as_deref())
        .bind(changes.data_realizacao.is_some())
        .bind(changes.data_realizacao.flatten())
        .bind(changes.user_id)
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_task(&self, id: i32, owner: Owner) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM tarefas WHERE id = $1 AND ($2::INT IS NULL OR user_id = $2)")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
