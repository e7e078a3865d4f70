//! Shared application state passed to every route handler.

use axum::extract::FromRef;
use axum_helpers::Terminator;
use core_config::AppInfo;
use domain_events::EventsState;
use std::path::PathBuf;
use std::sync::Arc;

/// Cloned per request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Identity reported by `GET /api`
    pub app: Arc<AppInfo>,
    pub events: EventsState,
    /// Lifecycle handle shared with the server loop
    pub terminator: Terminator,
    pub public_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(
        app: AppInfo,
        events: EventsState,
        terminator: Terminator,
        public_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            app: Arc::new(app),
            events,
            terminator,
            public_dir: Arc::new(public_dir.into()),
        }
    }
}

impl FromRef<AppState> for EventsState {
    fn from_ref(state: &AppState) -> Self {
        state.events.clone()
    }
}
