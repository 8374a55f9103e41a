use thiserror::Error;

pub type Result<T> = std::result::Result<T, HashError>;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Password must be between {min} and {max} bytes long")]
    InvalidPassword { min: usize, max: usize },
    #[error("Password does not match")]
    Mismatch,
    #[error("An error occurred while hashing")]
    Argon2(#[from] argon2::Error),
    #[error("The hashing task failed")]
    Task(#[from] tokio::task::JoinError),
}
