pub mod error;
pub mod data_layer;
pub mod dtos;

use std::sync::Arc;

use axum::async_trait;
use derive_more::Constructor;
use log::info;

use self::{
    data_layer::TodoDataLayer,
    dtos::{TodoDto, TodoPageDto, TodoResponseDto},
    error::{Result, TodoServiceError},
};

use super::tx_service::{close, Tx, TxService};

///
/// Service which manages the todos of a single owner. Every operation takes
/// the id of the authenticated caller, and never touches another user's todos.
///
#[async_trait]
pub trait TodoService: Send + Sync {
    ///
    /// Creates a todo owned by `user_id`
    ///
    async fn create_todo(&self, user_id: i64, dto: TodoDto) -> Result<TodoResponseDto>;
    ///
    /// Replaces the title and description of the todo `id`. Returns
    /// `TodoServiceError::Forbidden` if the todo isn't owned by `user_id`.
    ///
    async fn update_todo(&self, user_id: i64, id: i64, dto: TodoDto) -> Result<TodoResponseDto>;
    ///
    /// Deletes the todo `id`. Returns `TodoServiceError::Forbidden` if the
    /// todo isn't owned by `user_id`.
    ///
    async fn delete_todo(&self, user_id: i64, id: i64) -> Result<()>;
    ///
    /// Retrieves one page of the user's todos, ordered by id. Pages start at 1.
    ///
    async fn list_todos(&self, user_id: i64, page: i64, limit: i64) -> Result<TodoPageDto>;
}

#[derive(Clone, Constructor)]
pub struct CoreTodoService {
    data_layer: Arc<dyn TodoDataLayer>,
    tx_service: Arc<dyn TxService>,
}

#[async_trait]
impl TodoService for CoreTodoService {
    async fn create_todo(&self, user_id: i64, dto: TodoDto) -> Result<TodoResponseDto> {
        dto.validate()?;

        let mut tx = self.tx_service.begin().await?;
        let result = self.create_in_tx(&mut tx, user_id, dto).await;
        let todo = close(self.tx_service.as_ref(), tx, result).await?;

        info!("user {} created todo {}", user_id, todo.id);
        Ok(todo)
    }

    async fn update_todo(&self, user_id: i64, id: i64, dto: TodoDto) -> Result<TodoResponseDto> {
        dto.validate()?;

        let mut tx = self.tx_service.begin().await?;
        let result = self.update_in_tx(&mut tx, user_id, id, dto).await;
        close(self.tx_service.as_ref(), tx, result).await
    }

    async fn delete_todo(&self, user_id: i64, id: i64) -> Result<()> {
        let mut tx = self.tx_service.begin().await?;
        let result = self.delete_in_tx(&mut tx, user_id, id).await;
        close(self.tx_service.as_ref(), tx, result).await?;

        info!("user {} deleted todo {}", user_id, id);
        Ok(())
    }

    async fn list_todos(&self, user_id: i64, page: i64, limit: i64) -> Result<TodoPageDto> {
        if page < 1 || limit < 1 {
            return Err(TodoServiceError::Validation("page and limit must be at least 1".to_string()));
        }
        let offset = (page - 1).saturating_mul(limit);

        let todos = self.data_layer.get_todos_by_owner_paged(user_id, offset, limit).await?;
        if todos.is_empty() {
            return Err(TodoServiceError::NotFound);
        }

        // NOTE: counts every user's todos, not just the caller's
        let total = self.data_layer.count_todos().await?;

        Ok(TodoPageDto {
            data: todos.into_iter().map(TodoResponseDto::from).collect(),
            page,
            limit,
            total,
        })
    }
}

impl CoreTodoService {
    async fn create_in_tx(&self, tx: &mut Tx, user_id: i64, dto: TodoDto) -> Result<TodoResponseDto> {
        let id = self.data_layer.create_todo(tx, user_id, &dto.title, &dto.description).await?
            .ok_or(TodoServiceError::NoRowsReturned)?;

        Ok(TodoResponseDto { id, title: dto.title, description: dto.description })
    }

    async fn update_in_tx(&self, tx: &mut Tx, user_id: i64, id: i64, dto: TodoDto) -> Result<TodoResponseDto> {
        let mut todo = self.data_layer.get_todo_by_id_and_owner(tx, id, user_id).await?
            .ok_or(TodoServiceError::Forbidden)?;

        todo.title = dto.title;
        todo.description = dto.description;

        if self.data_layer.update_todo(tx, &todo).await? != 1 {
            return Err(TodoServiceError::RowsAffectedNotOne);
        }
        Ok(todo.into())
    }

    async fn delete_in_tx(&self, tx: &mut Tx, user_id: i64, id: i64) -> Result<()> {
        self.data_layer.get_todo_by_id_and_owner(tx, id, user_id).await?
            .ok_or(TodoServiceError::Forbidden)?;

        if self.data_layer.delete_todo(tx, id).await? != 1 {
            return Err(TodoServiceError::RowsAffectedNotOne);
        }
        Ok(())
    }
}
