//! Server infrastructure module.
//!
//! This module provides:
//! - The process lifecycle state machine and signal handling
//! - Serving an axum router with a bounded drain on shutdown
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{serve, Terminator};
//!
//! let terminator = Terminator::for_environment(environment);
//! serve(router, &config.server, terminator, cleanup).await?;
//! ```

pub mod app;
pub mod lifecycle;

pub use app::{serve, serve_with_listener};
pub use lifecycle::{DEFAULT_DRAIN_TIMEOUT, LifecycleState, Terminator};
