use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Assigns each request a request id, exposed to the trace span via request
/// extensions and echoed back on the response.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = HeaderValue::from_str(&Uuid::new_v4().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
    req.extensions_mut().insert(id.clone());

    let mut res = next.run(req).await;
    res.headers_mut().insert(REQUEST_ID_HEADER.clone(), id);
    res
}
