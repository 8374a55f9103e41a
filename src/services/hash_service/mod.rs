pub mod error;

use argon2::{Config, Variant};
use axum::async_trait;
use derive_more::Constructor;
use tokio::task;
use rand::{rngs::OsRng, Rng};

use self::error::{HashError, Result};

const SALT_LENGTH: usize = 16;
pub const MIN_PASSWORD_LENGTH: usize = 1;
pub const MAX_PASSWORD_LENGTH: usize = 72;

///
/// Both operations run on the blocking thread pool, so a slow hash never
/// stalls the async workers.
///
#[async_trait]
pub trait HashService: Send + Sync {
    ///
    /// Hashes `pwd` with a fresh random salt, returning the encoded hash
    /// (which carries its own salt and parameters).
    ///
    async fn hash_password(&self, pwd: &str) -> Result<String>;

    ///
    /// Verifies `pwd` against an encoded hash. A wrong password is reported
    /// as `HashError::Mismatch`, distinct from an internal failure.
    ///
    async fn verify_password(&self, pwd_hash: &str, pwd: &str) -> Result<()>;
}

///
/// Argon2id implementation of `HashService`. `cost` is the Argon2 time cost
/// (number of passes over memory).
///
#[derive(Clone, Constructor)]
pub struct CoreHashService {
    cost: u32,
}

#[async_trait]
impl HashService for CoreHashService {
    async fn hash_password(&self, pwd: &str) -> Result<String> {
        if pwd.len() < MIN_PASSWORD_LENGTH || pwd.len() > MAX_PASSWORD_LENGTH {
            return Err(HashError::InvalidPassword { min: MIN_PASSWORD_LENGTH, max: MAX_PASSWORD_LENGTH });
        }

        let mut rng = OsRng::default();
        let mut salt = [0u8; SALT_LENGTH];
        rng.fill(&mut salt);

        let time_cost = self.cost.max(1);
        let pwd = pwd.to_string();

        task::spawn_blocking(move || {
            let config = Config {
                variant: Variant::Argon2id,
                time_cost,
                ..Config::default()
            };
            argon2::hash_encoded(pwd.as_bytes(), &salt, &config)
        }).await?.map_err(HashError::from)
    }

    async fn verify_password(&self, pwd_hash: &str, pwd: &str) -> Result<()> {
        let (pwd_hash, pwd) = (pwd_hash.to_string(), pwd.to_string());

        let matches = task::spawn_blocking(move || argon2::verify_encoded(&pwd_hash, pwd.as_bytes())).await??;
        if matches {
            Ok(())
        } else {
            Err(HashError::Mismatch)
        }
    }
}
