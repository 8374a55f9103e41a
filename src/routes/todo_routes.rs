use std::{str::FromStr, sync::Arc};

use axum::{Router, routing::{post, put}, extract::{FromRef, Path, Query, State, rejection::JsonRejection}, http::StatusCode, Json, middleware};
use serde::Deserialize;

use crate::{
    middleware::auth_middleware::{AuthContext, auth_middleware},
    services::{todo_service::{TodoService, dtos::{TodoDto, TodoPageDto, TodoResponseDto}, error::{Result, TodoServiceError}}, token_service::TokenService},
};

#[derive(Clone, FromRef)]
pub struct TodoRoutesState {
    todo_service: Arc<dyn TodoService>,
}

///
/// Paging parameters arrive as raw strings, since a missing or malformed
/// value is reported by the handler rather than by the extractor
///
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    page: String,
    #[serde(default)]
    limit: String,
}

pub fn routes(todo_service: Arc<dyn TodoService>, token_service: Arc<dyn TokenService>) -> Router {
    Router::new()
        // Routes
        .route("/todos", post(create_todo).get(list_todos))
        .route("/todos/:id", put(update_todo).delete(delete_todo))
        // Auth middleware
        .route_layer(middleware::from_fn_with_state(token_service, auth_middleware))
        // State
        .with_state(TodoRoutesState { todo_service })
}

async fn create_todo(
    State(todo_service): State<Arc<dyn TodoService>>,
    ctx: AuthContext,
    dto: std::result::Result<Json<TodoDto>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoResponseDto>)> {
    let Json(dto) = dto.map_err(|e| TodoServiceError::Validation(e.body_text()))?;

    Ok((StatusCode::CREATED, Json(todo_service.create_todo(ctx.user_id, dto).await?)))
}

async fn update_todo(
    State(todo_service): State<Arc<dyn TodoService>>,
    ctx: AuthContext,
    Path(id): Path<String>,
    dto: std::result::Result<Json<TodoDto>, JsonRejection>,
) -> Result<Json<TodoResponseDto>> {
    // The body is checked before the id
    let Json(dto) = dto.map_err(|e| TodoServiceError::Validation(e.body_text()))?;
    let id = parse_param("id", &id)?;

    Ok(Json(todo_service.update_todo(ctx.user_id, id, dto).await?))
}

async fn delete_todo(
    State(todo_service): State<Arc<dyn TodoService>>,
    ctx: AuthContext,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_param("id", &id)?;
    todo_service.delete_todo(ctx.user_id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn list_todos(
    State(todo_service): State<Arc<dyn TodoService>>,
    ctx: AuthContext,
    Query(params): Query<PageParams>,
) -> Result<Json<TodoPageDto>> {
    let page = parse_param("page", &params.page)?;
    let limit = parse_param("limit", &params.limit)?;

    Ok(Json(todo_service.list_todos(ctx.user_id, page, limit).await?))
}

fn parse_param<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| TodoServiceError::InvalidParameter(format!("invalid {}: {:?}", name, value)))
}
