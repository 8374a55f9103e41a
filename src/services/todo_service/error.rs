use axum::{response::{IntoResponse, Response}, http::StatusCode};
use log::error;
use thiserror::Error;

use crate::{data_layer_error::DataLayerError, models::response_models::message_response, services::tx_service::error::TxError};

pub type Result<T> = std::result::Result<T, TodoServiceError>;

#[derive(Debug, Error)]
pub enum TodoServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InvalidParameter(String),
    #[error("todo could not be created")]
    NoRowsReturned,
    #[error("forbidden")]
    Forbidden,
    #[error("cannot find todos")]
    NotFound,
    #[error("rows affected not one")]
    RowsAffectedNotOne,
    #[error("An internal server error has occurred")]
    Transaction(TxError),
    #[error("An internal server error has occurred")]
    DataLayerError(DataLayerError),
}

impl From<DataLayerError> for TodoServiceError {
    fn from(e: DataLayerError) -> Self {
        TodoServiceError::DataLayerError(e)
    }
}

impl From<TxError> for TodoServiceError {
    fn from(e: TxError) -> Self {
        TodoServiceError::Transaction(e)
    }
}

impl TodoServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            TodoServiceError::Validation(_) | TodoServiceError::NoRowsReturned => StatusCode::BAD_REQUEST,
            TodoServiceError::Forbidden => StatusCode::FORBIDDEN,
            TodoServiceError::NotFound => StatusCode::NOT_FOUND,
            // Unparsable path and query parameters are answered as server errors
            TodoServiceError::InvalidParameter(_)
            | TodoServiceError::RowsAffectedNotOne
            | TodoServiceError::Transaction(_)
            | TodoServiceError::DataLayerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TodoServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{:?}", self);
        }
        message_response(status, self.to_string())
    }
}
