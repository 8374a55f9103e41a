pub mod error;
pub mod models;
pub mod settings;

use base64::{engine::general_purpose, Engine};
use chrono::{DateTime, Utc};
use derive_more::Constructor;
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use rand::{rngs::OsRng, Rng};
use serde::{de::DeserializeOwned, Serialize};
use sha2::Sha256;

use self::{
    error::{Result, TokenError},
    models::{AccessClaims, RefreshClaims, TimeBound},
    settings::TokenSettings,
};

const JTI_LENGTH: usize = 32;

pub trait TokenService: Send + Sync {
    ///
    /// Signs a short-lived access token for the given user, valid for the
    /// configured number of minutes.
    ///
    fn issue_access_token(&self, user_id: i64, name: &str, email: &str) -> Result<String>;

    ///
    /// Signs a long-lived refresh token for the given user, valid for the
    /// configured number of days. The caller is responsible for persisting it.
    ///
    fn issue_refresh_token(&self, user_id: i64) -> Result<String>;

    ///
    /// Verifies the signature and time window of an access token, returning
    /// its claims on success.
    ///
    fn verify_access_token(&self, access_token: &str) -> Result<AccessClaims>;

    ///
    /// Verifies the signature and time window of a refresh token. This does
    /// not check that the token is the one currently stored for the user.
    ///
    fn verify_refresh_token(&self, refresh_token: &str) -> Result<RefreshClaims>;
}

#[derive(Clone, Constructor)]
pub struct CoreTokenService {
    settings: TokenSettings,
}

impl TokenService for CoreTokenService {
    fn issue_access_token(&self, user_id: i64, name: &str, email: &str) -> Result<String> {
        self.issue_access_token_at(user_id, name, email, Utc::now())
    }

    fn issue_refresh_token(&self, user_id: i64) -> Result<String> {
        self.issue_refresh_token_at(user_id, generate_jti(), Utc::now())
    }

    fn verify_access_token(&self, access_token: &str) -> Result<AccessClaims> {
        self.verify_at(access_token, Utc::now())
    }

    fn verify_refresh_token(&self, refresh_token: &str) -> Result<RefreshClaims> {
        self.verify_at(refresh_token, Utc::now())
    }
}

impl CoreTokenService {
    fn issue_access_token_at(&self, user_id: i64, name: &str, email: &str, now: DateTime<Utc>) -> Result<String> {
        let expires = self.settings.access_token_expiry(now).ok_or(TokenError::InvalidLifetime)?;

        self.sign(&AccessClaims {
            id: user_id,
            name: name.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires.timestamp(),
        })
    }

    fn issue_refresh_token_at(&self, user_id: i64, jti: String, now: DateTime<Utc>) -> Result<String> {
        let expires = self.settings.refr_token_expiry(now).ok_or(TokenError::InvalidLifetime)?;

        self.sign(&RefreshClaims {
            id: user_id,
            jti,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires.timestamp(),
        })
    }

    fn key(&self) -> Result<Hmac<Sha256>> {
        Hmac::new_from_slice(self.settings.secret.as_bytes()).map_err(|_| TokenError::InvalidKey)
    }

    fn sign<C: Serialize>(&self, claims: &C) -> Result<String> {
        claims.sign_with_key(&self.key()?).map_err(TokenError::Signing)
    }

    fn verify_at<C: DeserializeOwned + TimeBound>(&self, token: &str, now: DateTime<Utc>) -> Result<C> {
        let claims: C = token.verify_with_key(&self.key()?).map_err(|e| match e {
            jwt::Error::InvalidSignature => TokenError::InvalidSignature,
            e => TokenError::Malformed(e),
        })?;

        // Signature is fine, now check the validity window
        let now = now.timestamp();
        if now < claims.nbf() {
            return Err(TokenError::NotYetValid);
        }
        if now >= claims.exp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

///
/// Generates a series of random OS bytes, with a length equal to `JTI_LENGTH`,
/// encoded as URL-safe base64
///
fn generate_jti() -> String {
    let mut rng = OsRng::default();
    let mut bytes = [0u8; JTI_LENGTH];
    rng.fill(&mut bytes);

    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
