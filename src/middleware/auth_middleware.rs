use std::sync::Arc;

use axum::{async_trait, extract::{FromRequestParts, State}, http::{request::Parts, StatusCode, Request}, middleware::Next, response::{IntoResponse, Response}};
use log::warn;
use tower_cookies::Cookies;

use crate::{models::response_models::message_response, services::token_service::TokenService};

pub const ACCESS_TOKEN_COOKIE: &str = "Authorization";

///
/// The authenticated caller, inserted into the request extensions by
/// `auth_middleware`
///
#[derive(Clone, Debug)]
pub struct AuthContext { pub user_id: i64 }

#[async_trait]
impl <S : Send + Sync> FromRequestParts<S> for AuthContext {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only reachable on a route the middleware wasn't applied to
        return if let Some(info) = parts.extensions.get::<AuthContext>() {
            Ok(info.clone())
        } else {
            Err(message_response(StatusCode::INTERNAL_SERVER_ERROR, "cannot find user id"))
        };
    }
}

///
/// Verifies the access token carried in the `Authorization` cookie, and
/// attaches the caller's `AuthContext` to the request. Requests without
/// a valid token never reach the handler.
///
pub async fn auth_middleware<B : Send> (
    cookies: Cookies,
    State(token_service): State<Arc<dyn TokenService>>,
    mut request: Request<B>,
    next: Next<B>
) -> Response {
    let Some(access_token) = cookies.get(ACCESS_TOKEN_COOKIE) else {
        return message_response(StatusCode::UNAUTHORIZED, "token not found");
    };

    match token_service.verify_access_token(access_token.value()) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthContext { user_id: claims.id });
            next.run(request).await
        }
        Err(e) => {
            warn!("rejected access token: {}", e);
            e.into_response()
        }
    }
}
