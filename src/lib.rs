use std::sync::Arc;

use axum::{middleware::from_fn_with_state, Router};
use sqlx::SqlitePool;
use tokio::sync::Semaphore;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::{self, TraceLayer};
use tracing::Level;

use crate::{
    middleware::rate_limit_middleware::rate_limit_middleware,
    routes::{auth_routes, todo_routes},
    services::{
        auth_service::{data_layer::DbAuthDataLayer, CoreAuthService},
        hash_service::CoreHashService,
        todo_service::{data_layer::DbTodoDataLayer, CoreTodoService},
        token_service::CoreTokenService,
        tx_service::DbTxService,
    },
    settings::Settings,
};

pub mod data_layer_error;
pub mod db;
pub mod settings;

pub mod middleware {
    pub mod auth_middleware;
    pub mod rate_limit_middleware;
}

pub mod models {
    pub mod auth_models;
    pub mod todo_models;
    pub mod response_models;
}

pub mod routes {
    pub mod auth_routes;
    pub mod todo_routes;
}

pub mod services {
    pub mod auth_service;
    pub mod hash_service;
    pub mod todo_service;
    pub mod token_service;
    pub mod tx_service;
}

#[cfg(test)]
mod test_support;

///
/// Builds the full application router on top of an already migrated pool
///
pub fn app(db: SqlitePool, settings: &Settings) -> Router {
    // Setup state
    let token_service = Arc::new(CoreTokenService::new(settings.token.clone()));
    let hash_service = Arc::new(CoreHashService::new(settings.hash_cost));
    let tx_service = Arc::new(DbTxService::new(db.clone()));

    let auth_data_layer = Arc::new(DbAuthDataLayer::new(db.clone()));
    let auth_service = Arc::new(CoreAuthService::new(auth_data_layer, tx_service.clone(), hash_service, token_service.clone()));

    let todo_data_layer = Arc::new(DbTodoDataLayer::new(db));
    let todo_service = Arc::new(CoreTodoService::new(todo_data_layer, tx_service));

    let permits = Arc::new(Semaphore::new(settings.request_limit));

    Router::new()
        // Routes
        .merge(auth_routes::routes(auth_service))
        .merge(todo_routes::routes(todo_service, token_service))
        // Request limit
        .layer(from_fn_with_state(permits, rate_limit_middleware))
        // Logging
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO))
        )
        // Cookies
        .layer(CookieManagerLayer::new())
}
