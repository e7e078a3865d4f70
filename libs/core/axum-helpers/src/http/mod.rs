//! HTTP-level helpers.
//!
//! - CORS negotiation applied by the dispatcher to every response

pub mod cors;

pub use cors::{ALLOWED_METHODS, AllowedOrigins, CorsPolicy};
