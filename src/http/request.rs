//! Request identification.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every API request
//! - Keep an ID the client already sent
//! - Echo the ID on the response so clients can correlate logs
//!
//! # Design Decisions
//! - Request ID added as the outermost layer so trace spans can carry it

use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Produces a fresh UUID v4 per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}
