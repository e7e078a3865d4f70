//! # Axum Helpers
//!
//! HTTP plumbing shared by the service binaries.
//!
//! ## Modules
//!
//! - **[`routing`]**: Ordered route table with `:param` and `*` patterns, and the dispatcher
//! - **[`http`]**: CORS negotiation
//! - **[`server`]**: Lifecycle state, signal handling, serving with a drain deadline
//! - **[`errors`]**: Structured error responses with error codes
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum_helpers::routing::{Dispatcher, RouteTable};
//! use axum_helpers::server::{serve, Terminator};
//! use axum_helpers::http::CorsPolicy;
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let table = RouteTable::builder()
//!         .get("/healthz", |ctx| async move { Ok::<_, AppError>(ctx.state.health_response()) })
//!         .build()?;
//!
//!     let terminator = Terminator::default();
//!     let router = Dispatcher::new(table, terminator.clone())
//!         .with_cors(CorsPolicy::any())
//!         .into_axum_router();
//!
//!     serve(router, &ServerConfig::default(), terminator, async {}).await?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod http;
pub mod routing;
pub mod server;

// Re-export routing types
pub use routing::{
    Dispatcher, MethodMatcher, PathParams, PathPattern, RouteContext, RouteError, RouteTable,
    RouteTableBuilder,
};

// Re-export server types
pub use server::{DEFAULT_DRAIN_TIMEOUT, LifecycleState, Terminator, serve, serve_with_listener};

// Re-export HTTP helpers
pub use http::CorsPolicy;

// Re-export error types
pub use errors::{AppError, ErrorCode, ErrorResponse};
