//! Request ID generation and context-seeding middleware

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use super::context_data::Carrier;
use super::fields::{clip, MAX_HEADER_VALUE_LEN};
use super::logger::Logger;

/// Header used to receive and echo the request identifier
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generate a new request ID using UUID v4
///
/// Returns a unique correlation ID for callers that did not receive one
/// from upstream.
///
/// # Examples
///
/// ```
/// use ctxlog::logging::generate_request_id;
///
/// let request_id = generate_request_id();
/// assert!(!request_id.is_empty());
/// ```
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Seed the request context with its identifier, method and path
///
/// Takes the identifier from `x-request-id` when present, otherwise generates
/// one. An incoming identifier is cut to 256 bytes before it enters the
/// context. The seeded [`Context`](crate::context::Context) is stored in the request
/// extensions, so handlers read it back with `Extension<Context>`. The
/// identifier is echoed on the response.
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use ctxlog::logging::{context_middleware, Logger};
///
/// let logger = Logger::new("orders-api");
/// let app: Router = Router::new()
///     .route("/", get(|| async { "ok" }))
///     .layer(middleware::from_fn_with_state(logger, context_middleware));
/// ```
pub async fn context_middleware(
    State(logger): State<Logger>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| clip(v, MAX_HEADER_VALUE_LEN).to_string())
        .unwrap_or_else(generate_request_id);

    let extra = [
        ("http_method", request.method().as_str().to_string()),
        ("path", request.uri().path().to_string()),
    ];
    let request = logger.set_context_data_and_set_value(request, extra, request_id.as_str());
    logger.log_request(&request.context(), &request);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
