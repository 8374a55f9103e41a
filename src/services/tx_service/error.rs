use thiserror::Error;

pub type Result<T> = std::result::Result<T, TxError>;

#[derive(Debug, Error)]
pub enum TxError {
    #[error("Could not begin transaction: {0}")]
    Begin(sqlx::Error),
    #[error("Could not commit transaction: {0}")]
    Commit(sqlx::Error),
    #[error("Could not roll back transaction: {0}")]
    Rollback(sqlx::Error),
}
