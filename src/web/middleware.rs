use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request logging middleware
///
/// Reuses a caller-supplied `x-request-id` or mints one, and echoes it on
/// the response.
pub async fn request_logging(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let start_time = Instant::now();

    tracing::info!(
        "Request started: request_id={} {} {} - User-Agent: {}",
        request_id,
        method,
        uri,
        user_agent
    );

    let mut response = next.run(req).await;

    tracing::info!(
        "Request completed: request_id={} {} {} - {} - {}ms",
        request_id,
        method,
        uri,
        response.status(),
        start_time.elapsed().as_millis()
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
