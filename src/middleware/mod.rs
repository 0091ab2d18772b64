// ABOUTME: HTTP middleware for the token exchange proxy
// ABOUTME: CORS configuration plus request ID generation and per-request tracing spans

pub mod cors;
pub mod tracing;

pub use cors::setup_cors;
pub use self::tracing::{with_request_tracing, REQUEST_ID_HEADER};
