//! Tally: analytics event ingestion service
//!
//! The binary in `main.rs` wires configuration, Postgres and the lifecycle
//! manager together; everything request-facing lives here so it can be
//! exercised without a network socket.

pub mod config;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::{route_table, router};
pub use state::AppState;
