use std::sync::Arc;

use axum::{extract::State, http::{Request, StatusCode}, middleware::Next, response::Response};
use log::warn;
use tokio::sync::Semaphore;

use crate::models::response_models::message_response;

///
/// Caps the number of requests in flight. Each request holds a permit until
/// its response has been produced; when none are left the request is
/// answered with 429 without reaching any handler.
///
pub async fn rate_limit_middleware<B : Send> (
    State(permits): State<Arc<Semaphore>>,
    request: Request<B>,
    next: Next<B>
) -> Response {
    let Ok(_permit) = permits.try_acquire_owned() else {
        warn!("request limit reached, rejecting {}", request.uri());
        return message_response(StatusCode::TOO_MANY_REQUESTS, "too many request");
    };

    next.run(request).await
}
