use axum::{response::{IntoResponse, Response}, http::StatusCode};
use thiserror::Error;

use crate::models::response_models::message_response;

pub type Result<T> = std::result::Result<T, TokenError>;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("The signing key is invalid")]
    InvalidKey,
    #[error("Could not sign token")]
    Signing(jwt::Error),
    #[error("Token signature is invalid")]
    InvalidSignature,
    #[error("Token is malformed: {0}")]
    Malformed(jwt::Error),
    #[error("The configured token lifetime is out of range")]
    InvalidLifetime,
    #[error("Token has expired")]
    Expired,
    #[error("Token is not valid yet")]
    NotYetValid,
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        message_response(StatusCode::UNAUTHORIZED, "Unauthorized")
    }
}
