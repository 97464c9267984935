use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Owner, Store, StoreError, StoreResult};
use crate::models::{NewTask, NewUser, Task, TaskChanges, User, UserChanges};

/// In-process `Store` that mirrors the SQL schema's rules: serial ids,
/// column length limits, the task-to-user foreign key and changed-row counts.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    tasks: Vec<Task>,
    next_user_id: i32,
    next_task_id: i32,
}

impl Tables {
    fn user_exists(&self, id: i32) -> bool {
        self.users.iter().any(|u| u.id_usuario == id)
    }

    fn check_task_owner(&self, user_id: i32) -> StoreResult<()> {
        if self.user_exists(user_id) {
            Ok(())
        } else {
            Err(StoreError::Constraint(format!(
                "tarefas.user_id {} does not reference an existing usuario",
                user_id
            )))
        }
    }
}

fn check_length(column: &str, value: &str, max: usize) -> StoreResult<()> {
    if value.chars().count() > max {
        return Err(StoreError::Constraint(format!(
            "value too long for {} (max {} characters)",
            column, max
        )));
    }
    Ok(())
}

fn check_user(user: &User) -> StoreResult<()> {
    check_length("usuarios.nome", &user.nome, 50)?;
    check_length("usuarios.email", &user.email, 100)?;
    check_length("usuarios.senha", &user.senha, 100)
}

fn check_task(task: &Task) -> StoreResult<()> {
    check_length("tarefas.titulo", &task.titulo, 30)?;
    check_length("tarefas.descricao", &task.descricao, 255)
}

fn owned_by(task: &Task, owner: Owner) -> bool {
    owner.map_or(true, |owner| task.user_id == owner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.lock().await;
        let mut created = User {
            id_usuario: 0,
            nome: user.nome,
            email: user.email,
            senha: user.senha,
        };
        check_user(&created)?;
        tables.next_user_id += 1;
        created.id_usuario = tables.next_user_id;
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.lock().await.users.clone())
    }

    async fn find_user_by_credentials(
        &self,
        email: &str,
        senha: &str,
    ) -> StoreResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email == email && u.senha == senha)
            .cloned())
    }

    async fn update_user(&self, id: i32, changes: &UserChanges) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        let Some(user) = tables.users.iter_mut().find(|u| u.id_usuario == id) else {
            return Ok(0);
        };
        let mut updated = user.clone();
        if !changes.apply(&mut updated) {
            return Ok(0);
        }
        check_user(&updated)?;
        *user = updated;
        Ok(1)
    }

    async fn delete_user(&self, id: i32, cascade: bool) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        if !tables.user_exists(id) {
            return Ok(0);
        }
        if cascade {
            tables.tasks.retain(|t| t.user_id != id);
        } else if tables.tasks.iter().any(|t| t.user_id == id) {
            return Err(StoreError::Constraint(format!(
                "usuario {} is still referenced from tarefas",
                id
            )));
        }
        tables.users.retain(|u| u.id_usuario != id);
        Ok(1)
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<Task> {
        let mut tables = self.tables.lock().await;
        let mut created = Task {
            id: 0,
            titulo: task.titulo,
            descricao: task.descricao,
            data_realizacao: task.data_realizacao,
            user_id: task.user_id,
        };
        check_task(&created)?;
        tables.check_task_owner(created.user_id)?;
        tables.next_task_id += 1;
        created.id = tables.next_task_id;
        tables.tasks.push(created.clone());
        Ok(created)
    }

    async fn list_tasks(&self, owner: Owner) -> StoreResult<Vec<Task>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| owned_by(t, owner))
            .cloned()
            .collect())
    }

    async fn update_task(&self, id: i32, changes: &TaskChanges, owner: Owner) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        let Some(index) = tables
            .tasks
            .iter()
            .position(|t| t.id == id && owned_by(t, owner))
        else {
            return Ok(0);
        };
        let mut updated = tables.tasks[index].clone();
        if !changes.apply(&mut updated) {
            return Ok(0);
        }
        check_task(&updated)?;
        tables.check_task_owner(updated.user_id)?;
        tables.tasks[index] = updated;
        Ok(1)
    }

    async fn delete_task(&self, id: i32, owner: Owner) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        let before = tables.tasks.len();
        tables.tasks.retain(|t| !(t.id == id && owned_by(t, owner)));
        Ok((before - tables.tasks.len()) as u64)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
