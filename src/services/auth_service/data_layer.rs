use axum::async_trait;
use derive_more::Constructor;
use sqlx::SqlitePool;

use crate::{data_layer_error::Result, models::auth_models::UserModel, services::tx_service::Tx};

#[async_trait]
pub trait AuthDataLayer: Send + Sync {
    ///
    /// Inserts a new user and returns its generated id. Returns `None` when
    /// the insert produced no row (the email is already registered).
    ///
    async fn create_user<'a>(&self, tx: &mut Tx, name: &'a str, email: &'a str, pwd_hash: &'a str) -> Result<Option<i64>>;
    ///
    /// Replaces the user's stored refresh token, returning the number of
    /// rows affected.
    ///
    async fn update_user_refr_token<'a>(&self, tx: &mut Tx, user_id: i64, token: &'a str) -> Result<u64>;
    async fn get_user_by_email<'a>(&self, tx: &mut Tx, email: &'a str) -> Result<Option<UserModel>>;
    ///
    /// Read-only lookup by exact refresh token, outside of any transaction
    ///
    async fn get_user_by_refr_token<'a>(&self, token: &'a str) -> Result<Option<UserModel>>;
}

#[derive(Constructor)]
pub struct DbAuthDataLayer {
    db: SqlitePool,
}

#[async_trait]
impl AuthDataLayer for DbAuthDataLayer {
    async fn create_user<'a>(&self, tx: &mut Tx, name: &'a str, email: &'a str, pwd_hash: &'a str) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>("
            INSERT INTO users (name, email, pwd_hash) VALUES (?, ?, ?)
            ON CONFLICT (email) DO NOTHING
            RETURNING id
            ")
            .bind(name)
            .bind(email)
            .bind(pwd_hash)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(id)
    }
    async fn update_user_refr_token<'a>(&self, tx: &mut Tx, user_id: i64, token: &'a str) -> Result<u64> {
        let res = sqlx::query("UPDATE users SET refresh_token = ? WHERE id = ?")
            .bind(token)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        Ok(res.rows_affected())
    }
    async fn get_user_by_email<'a>(&self, tx: &mut Tx, email: &'a str) -> Result<Option<UserModel>> {
        let user = sqlx::query_as::<_, UserModel>(
            "SELECT id, name, email, pwd_hash, refresh_token FROM users WHERE email = ?"
        )
            .bind(email)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(user)
    }
    async fn get_user_by_refr_token<'a>(&self, token: &'a str) -> Result<Option<UserModel>> {
        let user = sqlx::query_as::<_, UserModel>(
            "SELECT id, name, email, pwd_hash, refresh_token FROM users WHERE refresh_token = ?"
        )
            .bind(token)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }
}
