pub mod error;
pub mod data_layer;
pub mod dtos;

use std::sync::Arc;

use axum::async_trait;
use derive_more::Constructor;
use log::{info, warn};

use self::{
    data_layer::AuthDataLayer,
    dtos::{LoginDto, RegisterDto, TokensDto},
    error::{AuthServiceError, Result},
};

use super::{
    hash_service::HashService,
    token_service::TokenService,
    tx_service::{close, Tx, TxService},
};

///
/// Service which registers users, accepts their credentials, and exchanges
/// refresh tokens for new access tokens.
///
#[async_trait]
pub trait AuthService: Send + Sync {
    ///
    /// Creates a new user and signs them in, returning a fresh access
    /// and refresh token.
    ///
    async fn register(&self, dto: RegisterDto) -> Result<TokensDto>;
    ///
    /// Verifies the user's credentials, returning a fresh access and refresh
    /// token. The new refresh token replaces any previously issued one.
    ///
    async fn login(&self, dto: LoginDto) -> Result<TokensDto>;
    ///
    /// Exchanges the user's current refresh token for a new access token.
    ///
    async fn refresh_access_token(&self, refr_token: &str) -> Result<String>;
}

#[derive(Clone, Constructor)]
pub struct CoreAuthService {
    data_layer: Arc<dyn AuthDataLayer>,
    tx_service: Arc<dyn TxService>,
    hash_service: Arc<dyn HashService>,
    token_service: Arc<dyn TokenService>,
}

#[async_trait]
impl AuthService for CoreAuthService {
    async fn register(&self, dto: RegisterDto) -> Result<TokensDto> {
        dto.validate()?;

        let mut tx = self.tx_service.begin().await?;
        let result = self.register_in_tx(&mut tx, &dto).await;
        let tokens = close(self.tx_service.as_ref(), tx, result).await?;

        info!("registered new user");
        Ok(tokens)
    }

    async fn login(&self, dto: LoginDto) -> Result<TokensDto> {
        dto.validate()?;

        let mut tx = self.tx_service.begin().await?;
        let result = self.login_in_tx(&mut tx, &dto).await;
        close(self.tx_service.as_ref(), tx, result).await
    }

    async fn refresh_access_token(&self, refr_token: &str) -> Result<String> {
        let claims = self.token_service.verify_refresh_token(refr_token)
            .map_err(AuthServiceError::InvalidRefreshToken)?;

        // Only the most recently issued refresh token is stored, so an older
        // (still correctly signed) token won't be found here
        let user = self.data_layer.get_user_by_refr_token(refr_token).await?
            .filter(|user| user.id == claims.id)
            .ok_or(AuthServiceError::RefreshTokenNotFound)?;

        Ok(self.token_service.issue_access_token(user.id, &user.name, &user.email)?)
    }
}

impl CoreAuthService {
    async fn register_in_tx(&self, tx: &mut Tx, dto: &RegisterDto) -> Result<TokensDto> {
        let pwd_hash = self.hash_service.hash_password(&dto.password).await?;

        let user_id = self.data_layer.create_user(tx, &dto.name, &dto.email, &pwd_hash).await?
            .ok_or(AuthServiceError::NoRowsReturned)?;

        self.sign_in(tx, user_id, &dto.name, &dto.email).await
    }

    async fn login_in_tx(&self, tx: &mut Tx, dto: &LoginDto) -> Result<TokensDto> {
        // Unknown emails and wrong passwords must be indistinguishable
        let user = match self.data_layer.get_user_by_email(tx, &dto.email).await? {
            Some(user) => user,
            None => {
                warn!("login attempt for unknown email");
                return Err(AuthServiceError::WrongCredentials);
            }
        };

        if let Err(e) = self.hash_service.verify_password(&user.pwd_hash, &dto.password).await {
            warn!("login attempt rejected for user {}: {}", user.id, e);
            return Err(AuthServiceError::WrongCredentials);
        }

        let tokens = self.sign_in(tx, user.id, &user.name, &user.email).await?;
        info!("user {} logged in", user.id);
        Ok(tokens)
    }

    ///
    /// Issues both tokens for the user, and stores the refresh token
    /// against the user's row, replacing any previous one
    ///
    async fn sign_in(&self, tx: &mut Tx, user_id: i64, name: &str, email: &str) -> Result<TokensDto> {
        let access_token = self.token_service.issue_access_token(user_id, name, email)?;
        let refresh_token = self.token_service.issue_refresh_token(user_id)?;

        let rows_affected = self.data_layer.update_user_refr_token(tx, user_id, &refresh_token).await?;
        if rows_affected != 1 {
            return Err(AuthServiceError::RowsAffectedNotOne);
        }

        Ok(TokensDto { access_token, refresh_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::auth_models::UserModel,
        services::{
            auth_service::data_layer::DbAuthDataLayer,
            hash_service::{error::HashError, CoreHashService},
            token_service::{settings::TokenSettings, CoreTokenService},
            tx_service::{error::TxError, DbTxService},
        },
        test_support::{file_db, memory_db, FlakyTxService},
    };
    use sqlx::SqlitePool;

    struct FailingHashService;

    #[async_trait]
    impl HashService for FailingHashService {
        async fn hash_password(&self, _pwd: &str) -> crate::services::hash_service::error::Result<String> {
            Err(HashError::InvalidPassword { min: 1, max: 72 })
        }
        async fn verify_password(&self, _pwd_hash: &str, _pwd: &str) -> crate::services::hash_service::error::Result<()> {
            Err(HashError::Mismatch)
        }
    }

    ///
    /// Wraps the real data layer, but can pretend the refresh token update
    /// touched no rows
    ///
    struct LossyAuthDataLayer {
        inner: DbAuthDataLayer,
        lose_updates: bool,
    }

    #[async_trait]
    impl AuthDataLayer for LossyAuthDataLayer {
        async fn create_user<'a>(&self, tx: &mut Tx, name: &'a str, email: &'a str, pwd_hash: &'a str) -> crate::data_layer_error::Result<Option<i64>> {
            self.inner.create_user(tx, name, email, pwd_hash).await
        }
        async fn update_user_refr_token<'a>(&self, tx: &mut Tx, user_id: i64, token: &'a str) -> crate::data_layer_error::Result<u64> {
            if self.lose_updates {
                return Ok(0);
            }
            self.inner.update_user_refr_token(tx, user_id, token).await
        }
        async fn get_user_by_email<'a>(&self, tx: &mut Tx, email: &'a str) -> crate::data_layer_error::Result<Option<UserModel>> {
            self.inner.get_user_by_email(tx, email).await
        }
        async fn get_user_by_refr_token<'a>(&self, token: &'a str) -> crate::data_layer_error::Result<Option<UserModel>> {
            self.inner.get_user_by_refr_token(token).await
        }
    }

    fn token_service() -> Arc<CoreTokenService> {
        Arc::new(CoreTokenService::new(TokenSettings {
            secret: "test-secret".to_string(),
            access_token_lifetime_m: 15,
            refr_token_lifetime_d: 7,
        }))
    }

    fn service(db: &SqlitePool) -> CoreAuthService {
        CoreAuthService::new(
            Arc::new(DbAuthDataLayer::new(db.clone())),
            Arc::new(DbTxService::new(db.clone())),
            Arc::new(CoreHashService::new(1)),
            token_service(),
        )
    }

    fn register_dto() -> RegisterDto {
        RegisterDto { name: "John Doe".into(), email: "john@doe.com".into(), password: "password".into() }
    }

    fn login_dto() -> LoginDto {
        LoginDto { email: "john@doe.com".into(), password: "password".into() }
    }

    async fn count_users(db: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(db).await.unwrap()
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let db = memory_db().await;
        let svc = service(&db);

        let registered = svc.register(register_dto()).await.unwrap();
        assert!(!registered.access_token.is_empty());
        assert!(!registered.refresh_token.is_empty());

        let logged_in = svc.login(login_dto()).await.unwrap();
        assert!(!logged_in.access_token.is_empty());
        assert!(!logged_in.refresh_token.is_empty());
        assert_ne!(registered.refresh_token, logged_in.refresh_token);
    }

    #[tokio::test]
    async fn test_register_validation_error() {
        let db = memory_db().await;
        let svc = service(&db);

        let result = svc.register(RegisterDto::default()).await;
        assert!(matches!(result, Err(AuthServiceError::Validation(_))));
        assert_eq!(count_users(&db).await, 0);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let db = memory_db().await;
        let svc = service(&db);

        svc.register(register_dto()).await.unwrap();
        let result = svc.register(register_dto()).await;
        assert!(matches!(result, Err(AuthServiceError::NoRowsReturned)));
        assert_eq!(result.unwrap_err().status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_hash_error_rolls_back() {
        let db = memory_db().await;
        let tx_service = Arc::new(FlakyTxService::working(db.clone()));
        let svc = CoreAuthService::new(
            Arc::new(DbAuthDataLayer::new(db.clone())),
            tx_service.clone(),
            Arc::new(FailingHashService),
            token_service(),
        );

        let result = svc.register(register_dto()).await;
        assert!(matches!(result, Err(AuthServiceError::Hash(_))));
        assert_eq!(tx_service.calls(), vec!["rollback"]);
    }

    #[tokio::test]
    async fn test_register_hash_error_rollback_error() {
        let db = memory_db().await;
        let tx_service = Arc::new(FlakyTxService::failing(db.clone()));
        let svc = CoreAuthService::new(
            Arc::new(DbAuthDataLayer::new(db.clone())),
            tx_service.clone(),
            Arc::new(FailingHashService),
            token_service(),
        );

        let result = svc.register(register_dto()).await;
        assert!(matches!(result, Err(AuthServiceError::Transaction(TxError::Rollback(_)))));
        assert_eq!(result.unwrap_err().status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_register_commit_error() {
        let db = memory_db().await;
        let svc = CoreAuthService::new(
            Arc::new(DbAuthDataLayer::new(db.clone())),
            Arc::new(FlakyTxService::failing(db.clone())),
            Arc::new(CoreHashService::new(1)),
            token_service(),
        );

        let result = svc.register(register_dto()).await;
        assert!(matches!(result, Err(AuthServiceError::Transaction(TxError::Commit(_)))));
        assert_eq!(count_users(&db).await, 0);
    }

    #[tokio::test]
    async fn test_register_rows_affected_not_one() {
        let db = memory_db().await;
        let tx_service = Arc::new(FlakyTxService::working(db.clone()));
        let svc = CoreAuthService::new(
            Arc::new(LossyAuthDataLayer { inner: DbAuthDataLayer::new(db.clone()), lose_updates: true }),
            tx_service.clone(),
            Arc::new(CoreHashService::new(1)),
            token_service(),
        );

        let result = svc.register(register_dto()).await;
        assert!(matches!(result, Err(AuthServiceError::RowsAffectedNotOne)));
        assert_eq!(tx_service.calls(), vec!["rollback"]);
        assert_eq!(count_users(&db).await, 0);
    }

    #[tokio::test]
    async fn test_begin_error() {
        let db = memory_db().await;
        let svc = service(&db);
        db.close().await;

        let result = svc.register(register_dto()).await;
        assert!(matches!(result, Err(AuthServiceError::Transaction(TxError::Begin(_)))));
    }

    #[tokio::test]
    async fn test_login_does_not_reveal_unknown_email() {
        let db = memory_db().await;
        let svc = service(&db);
        svc.register(register_dto()).await.unwrap();

        let wrong_password = svc.login(LoginDto { password: "passw0rd".into(), ..login_dto() }).await.unwrap_err();
        let unknown_email = svc.login(LoginDto { email: "jane@doe.com".into(), ..login_dto() }).await.unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.status(), unknown_email.status());
        assert_eq!(wrong_password.to_string(), "wrong email or password");
    }

    #[tokio::test]
    async fn test_login_business_error_superseded_by_rollback_error() {
        let db = memory_db().await;
        service(&db).register(register_dto()).await.unwrap();

        let svc = CoreAuthService::new(
            Arc::new(DbAuthDataLayer::new(db.clone())),
            Arc::new(FlakyTxService::failing(db.clone())),
            Arc::new(CoreHashService::new(1)),
            token_service(),
        );

        let result = svc.login(LoginDto { password: "passw0rd".into(), ..login_dto() }).await;
        assert!(matches!(result, Err(AuthServiceError::Transaction(TxError::Rollback(_)))));
    }

    #[tokio::test]
    async fn test_login_rows_affected_not_one() {
        let db = memory_db().await;
        service(&db).register(register_dto()).await.unwrap();

        let svc = CoreAuthService::new(
            Arc::new(LossyAuthDataLayer { inner: DbAuthDataLayer::new(db.clone()), lose_updates: true }),
            Arc::new(DbTxService::new(db.clone())),
            Arc::new(CoreHashService::new(1)),
            token_service(),
        );

        let result = svc.login(login_dto()).await;
        assert!(matches!(result, Err(AuthServiceError::RowsAffectedNotOne)));
    }

    #[tokio::test]
    async fn test_refresh_only_accepts_latest_token() {
        let db = memory_db().await;
        let svc = service(&db);

        let first = svc.register(register_dto()).await.unwrap();
        let access_token = svc.refresh_access_token(&first.refresh_token).await.unwrap();
        assert!(!access_token.is_empty());

        let second = svc.login(login_dto()).await.unwrap();
        let result = svc.refresh_access_token(&first.refresh_token).await;
        assert!(matches!(result, Err(AuthServiceError::RefreshTokenNotFound)));

        assert!(svc.refresh_access_token(&second.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_issues_access_token_for_user() {
        let db = memory_db().await;
        let svc = service(&db);
        let tokens = svc.register(register_dto()).await.unwrap();

        let access_token = svc.refresh_access_token(&tokens.refresh_token).await.unwrap();
        let claims = token_service().verify_access_token(&access_token).unwrap();
        assert_eq!(claims.name, "John Doe");
        assert_eq!(claims.email, "john@doe.com");
    }

    #[tokio::test]
    async fn test_refresh_rejects_forged_token() {
        let db = memory_db().await;
        let svc = service(&db);

        let result = svc.refresh_access_token("not.a.token").await;
        assert!(matches!(result, Err(AuthServiceError::InvalidRefreshToken(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_and_logins() {
        let file = file_db().await;
        let svc = Arc::new(service(&file.db));

        let dto = |i: usize| RegisterDto { name: format!("user {}", i), email: format!("user{}@doe.com", i), password: "password".into() };

        let registrations: Vec<_> = (0..16)
            .map(|i| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.register(dto(i)).await })
            })
            .collect();
        for handle in registrations {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(count_users(&file.db).await, 16);

        let logins: Vec<_> = (0..16)
            .map(|i| {
                let svc = svc.clone();
                tokio::spawn(async move {
                    svc.login(LoginDto { email: format!("user{}@doe.com", i), password: "password".into() }).await
                })
            })
            .collect();
        for handle in logins {
            let tokens = handle.await.unwrap().unwrap();
            assert!(svc.refresh_access_token(&tokens.refresh_token).await.is_ok());
        }
    }
}
