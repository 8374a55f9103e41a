use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::{Deserialize, Serialize};

///
/// Body of every error response, and of the auth endpoints' responses
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageModel {
    pub message: String,
}

impl MessageModel {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

pub fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(MessageModel::new(message))).into_response()
}
