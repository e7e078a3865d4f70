//! Ordered, pattern-based request routing.
//!
//! ```ignore
//! use axum_helpers::routing::{Dispatcher, RouteTable};
//!
//! let table = RouteTable::builder()
//!     .options("*", preflight)
//!     .get("/healthz", health)
//!     .post("/api/events/:name", record_event)
//!     .get("*", assets)
//!     .build()?;
//!
//! let app = Dispatcher::new(table, state).into_axum_router();
//! ```

pub mod dispatcher;
pub mod pattern;
pub mod table;

pub use dispatcher::{Dispatcher, ErrorReporter};
pub use pattern::{PathParams, PathPattern, RouteError};
pub use table::{MethodMatcher, Route, RouteContext, RouteHandler, RouteTable, RouteTableBuilder};
