use axum::async_trait;
use derive_more::Constructor;
use sqlx::SqlitePool;

use crate::{data_layer_error::Result, models::todo_models::TodoModel, services::tx_service::Tx};

#[async_trait]
pub trait TodoDataLayer: Send + Sync {
    ///
    /// Inserts a todo owned by `user_id`, returning its generated id, or
    /// `None` if the insert returned no row.
    ///
    async fn create_todo<'a>(&self, tx: &mut Tx, user_id: i64, title: &'a str, description: &'a str) -> Result<Option<i64>>;
    ///
    /// Owner-scoped lookup. `None` covers both a missing todo and one owned
    /// by another user.
    ///
    async fn get_todo_by_id_and_owner(&self, tx: &mut Tx, id: i64, user_id: i64) -> Result<Option<TodoModel>>;
    async fn update_todo<'a>(&self, tx: &mut Tx, todo: &'a TodoModel) -> Result<u64>;
    async fn delete_todo(&self, tx: &mut Tx, id: i64) -> Result<u64>;
    ///
    /// A page of the user's todos, ordered by ascending id
    ///
    async fn get_todos_by_owner_paged(&self, user_id: i64, offset: i64, limit: i64) -> Result<Vec<TodoModel>>;
    ///
    /// Number of todos across all users
    ///
    async fn count_todos(&self) -> Result<i64>;
}

#[derive(Constructor)]
pub struct DbTodoDataLayer {
    db: SqlitePool,
}

#[async_trait]
impl TodoDataLayer for DbTodoDataLayer {
    async fn create_todo<'a>(&self, tx: &mut Tx, user_id: i64, title: &'a str, description: &'a str) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO todos (user_id, title, description) VALUES (?, ?, ?) RETURNING id"
        )
            .bind(user_id)
            .bind(title)
            .bind(description)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(id)
    }
    async fn get_todo_by_id_and_owner(&self, tx: &mut Tx, id: i64, user_id: i64) -> Result<Option<TodoModel>> {
        let todo = sqlx::query_as::<_, TodoModel>(
            "SELECT id, user_id, title, description FROM todos WHERE id = ? AND user_id = ?"
        )
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(todo)
    }
    async fn update_todo<'a>(&self, tx: &mut Tx, todo: &'a TodoModel) -> Result<u64> {
        let res = sqlx::query("UPDATE todos SET title = ?, description = ? WHERE id = ?")
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.id)
            .execute(&mut **tx)
            .await?;

        Ok(res.rows_affected())
    }
    async fn delete_todo(&self, tx: &mut Tx, id: i64) -> Result<u64> {
        let res = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(res.rows_affected())
    }
    async fn get_todos_by_owner_paged(&self, user_id: i64, offset: i64, limit: i64) -> Result<Vec<TodoModel>> {
        let todos = sqlx::query_as::<_, TodoModel>("
            SELECT id, user_id, title, description FROM todos
            WHERE user_id = ?
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            ")
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

        Ok(todos)
    }
    async fn count_todos(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM todos")
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }
}
