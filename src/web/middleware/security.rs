//! Security headers.

use axum::{
    body::Body,
    http::{
        header::{HeaderValue, CONTENT_SECURITY_POLICY, X_CONTENT_TYPE_OPTIONS},
        Request,
    },
    middleware::Next,
    response::Response,
};
use tower_http::set_header::SetResponseHeaderLayer;

/// Adds `X-Content-Type-Options: nosniff` to every response that lacks it.
pub fn nosniff_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(
        X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    )
}

/// Headers for routes that return stored file content.
///
/// Adds the following headers:
/// - Content-Security-Policy: sandbox
/// - X-Content-Type-Options: nosniff
///
/// An uploaded HTML or SVG file opened through `/direct` is then rendered in
/// an opaque origin and cannot script the API.
pub async fn sandbox_user_content(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(CONTENT_SECURITY_POLICY, HeaderValue::from_static("sandbox"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));

    response
}
