use axum::{response::{IntoResponse, Response}, http::StatusCode};
use log::error;
use thiserror::Error;

use crate::{
    data_layer_error::DataLayerError,
    models::response_models::message_response,
    services::{hash_service::error::HashError, token_service::error::TokenError, tx_service::error::TxError},
};

pub type Result<T> = std::result::Result<T, AuthServiceError>;

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("wrong email or password")]
    WrongCredentials,
    #[error("user could not be created")]
    NoRowsReturned,
    #[error("refresh token not found")]
    CookieNotFound,
    #[error("Unauthorized")]
    InvalidRefreshToken(TokenError),
    #[error("cannot find user by refresh token")]
    RefreshTokenNotFound,
    #[error("rows affected not one")]
    RowsAffectedNotOne,
    #[error("An internal server error has occurred")]
    Hash(HashError),
    #[error("An internal server error has occurred")]
    Token(TokenError),
    #[error("An internal server error has occurred")]
    Transaction(TxError),
    #[error("An internal server error has occurred")]
    DataLayerError(DataLayerError),
}

impl From<DataLayerError> for AuthServiceError {
    fn from(e: DataLayerError) -> Self {
        AuthServiceError::DataLayerError(e)
    }
}

impl From<TxError> for AuthServiceError {
    fn from(e: TxError) -> Self {
        AuthServiceError::Transaction(e)
    }
}

impl From<HashError> for AuthServiceError {
    fn from(e: HashError) -> Self {
        AuthServiceError::Hash(e)
    }
}

impl From<TokenError> for AuthServiceError {
    fn from(e: TokenError) -> Self {
        AuthServiceError::Token(e)
    }
}

impl AuthServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthServiceError::Validation(_)
            | AuthServiceError::WrongCredentials
            | AuthServiceError::NoRowsReturned
            | AuthServiceError::RefreshTokenNotFound => StatusCode::BAD_REQUEST,
            AuthServiceError::CookieNotFound | AuthServiceError::InvalidRefreshToken(_) => StatusCode::UNAUTHORIZED,
            AuthServiceError::RowsAffectedNotOne
            | AuthServiceError::Hash(_)
            | AuthServiceError::Token(_)
            | AuthServiceError::Transaction(_)
            | AuthServiceError::DataLayerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{:?}", self);
        }
        message_response(status, self.to_string())
    }
}
