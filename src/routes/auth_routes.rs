use std::sync::Arc;

use axum::{Router, routing::post, extract::{FromRef, State, rejection::JsonRejection}, http::StatusCode, Json};
use tower_cookies::{Cookie, Cookies};

use crate::{
    middleware::auth_middleware::ACCESS_TOKEN_COOKIE,
    models::response_models::MessageModel,
    services::auth_service::{AuthService, dtos::{LoginDto, RegisterDto, TokensDto}, error::{AuthServiceError, Result}},
};

pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

#[derive(Clone, FromRef)]
pub struct AuthRoutesState {
    auth_service: Arc<dyn AuthService>,
}

pub fn routes(auth_service: Arc<dyn AuthService>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .with_state(AuthRoutesState { auth_service })
}

async fn register(
    State(auth_service): State<Arc<dyn AuthService>>,
    cookies: Cookies,
    dto: std::result::Result<Json<RegisterDto>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageModel>)> {
    let Json(dto) = dto.map_err(|e| AuthServiceError::Validation(e.body_text()))?;
    let tokens = auth_service.register(dto).await?;

    set_token_cookies(&cookies, tokens);
    Ok((StatusCode::CREATED, Json(MessageModel::new("successfully registered"))))
}

async fn login(
    State(auth_service): State<Arc<dyn AuthService>>,
    cookies: Cookies,
    dto: std::result::Result<Json<LoginDto>, JsonRejection>,
) -> Result<Json<MessageModel>> {
    let Json(dto) = dto.map_err(|e| AuthServiceError::Validation(e.body_text()))?;
    let tokens = auth_service.login(dto).await?;

    set_token_cookies(&cookies, tokens);
    Ok(Json(MessageModel::new("successfully login")))
}

async fn refresh_token(
    State(auth_service): State<Arc<dyn AuthService>>,
    cookies: Cookies,
) -> Result<Json<MessageModel>> {
    let refr_token = cookies.get(REFRESH_TOKEN_COOKIE)
        .ok_or(AuthServiceError::CookieNotFound)?;

    let access_token = auth_service.refresh_access_token(refr_token.value()).await?;

    cookies.add(token_cookie(ACCESS_TOKEN_COOKIE, access_token));
    Ok(Json(MessageModel::new("successfully refresh token")))
}

fn set_token_cookies(cookies: &Cookies, tokens: TokensDto) {
    cookies.add(token_cookie(ACCESS_TOKEN_COOKIE, tokens.access_token));
    cookies.add(token_cookie(REFRESH_TOKEN_COOKIE, tokens.refresh_token));
}

fn token_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .finish()
}
