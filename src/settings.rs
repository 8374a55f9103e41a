use std::{env, fs, net::SocketAddr, path::Path};

use chrono::Utc;

use serde::Deserialize;
use thiserror::Error;

use crate::services::token_service::settings::TokenSettings;

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse settings file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Environment variable {0} is invalid")]
    InvalidEnv(&'static str),
    #[error("JWT_SECRET must be provided")]
    MissingSecret,
    #[error("{0} must be a positive, representable token lifetime")]
    InvalidTokenLifetime(&'static str),
}

///
/// Application-wide settings. Loaded from a JSON file, after which any
/// matching environment variable takes precedence.
///
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub addr: SocketAddr,
    /// Argon2 time cost used when hashing passwords
    pub hash_cost: u32,
    /// Maximum number of requests handled concurrently
    pub request_limit: usize,
    pub token: TokenSettings,
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut settings: Settings = serde_json::from_str(&fs::read_to_string(path)?)?;
        settings.apply_env()?;
        settings.validate()?;

        Ok(settings)
    }

    ///
    /// Rejects settings the server can't run with, so a bad value fails at
    /// startup instead of on the first login
    ///
    pub fn validate(&self) -> Result<()> {
        if self.token.secret.is_empty() {
            return Err(SettingsError::MissingSecret);
        }

        let now = Utc::now();
        if self.token.access_token_expiry(now).is_none() {
            return Err(SettingsError::InvalidTokenLifetime("JWT_ACCESS_TOKEN_TIME"));
        }
        if self.token.refr_token_expiry(now).is_none() {
            return Err(SettingsError::InvalidTokenLifetime("JWT_REFRESH_TOKEN_TIME"));
        }
        Ok(())
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = env::var("DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(secret) = env::var("JWT_SECRET") {
            self.token.secret = secret;
        }
        if let Some(addr) = parse_env("HOST")? {
            self.addr = addr;
        }
        if let Some(lifetime) = parse_env("JWT_ACCESS_TOKEN_TIME")? {
            self.token.access_token_lifetime_m = lifetime;
        }
        if let Some(lifetime) = parse_env("JWT_REFRESH_TOKEN_TIME")? {
            self.token.refr_token_lifetime_d = lifetime;
        }
        if let Some(cost) = parse_env("HASH_COST")? {
            self.hash_cost = cost;
        }
        if let Some(limit) = parse_env("NUMBER_OF_LIMIT")? {
            self.request_limit = limit;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(value) => value.parse().map(Some).map_err(|_| SettingsError::InvalidEnv(key)),
        Err(_) => Ok(None),
    }
}
