use serde::{Deserialize, Serialize};

use crate::models::todo_models::TodoModel;

use super::error::{Result, TodoServiceError};

///
/// Request body for both creating and updating a todo
///
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TodoDto {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodoResponseDto {
    pub id: i64,
    pub title: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodoPageDto {
    pub data: Vec<TodoResponseDto>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

impl TodoDto {
    pub fn validate(&self) -> Result<()> {
        if self.title.is_empty() {
            return Err(TodoServiceError::Validation("title is required".to_string()));
        }
        if self.description.is_empty() {
            return Err(TodoServiceError::Validation("description is required".to_string()));
        }
        Ok(())
    }
}

impl From<TodoModel> for TodoResponseDto {
    fn from(todo: TodoModel) -> Self {
        TodoResponseDto { id: todo.id, title: todo.title, description: todo.description }
    }
}
