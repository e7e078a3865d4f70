use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use core_config::Environment;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How long the process stays `terminating` before the server is stopped.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Process lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Running,
    Terminating,
    Shutdown,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Terminating => "terminating",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owned handle to the process lifecycle state.
///
/// Clones share one watch cell. The signal listener flips it; the serve
/// loop and the health probe read it.
///
/// # Example
/// ```ignore
/// let terminator = Terminator::for_environment(Environment::from_env());
/// let signals = terminator.listen_for_signals();
///
/// terminator.clone().terminated().await;
/// tokio::time::sleep(terminator.drain_timeout()).await;
/// ```
#[derive(Clone, Debug)]
pub struct Terminator {
    state: Arc<watch::Sender<LifecycleState>>,
    drain_timeout: Duration,
}

impl Terminator {
    pub fn new(drain_timeout: Duration) -> Self {
        let (state, _) = watch::channel(LifecycleState::Running);
        Self {
            state: Arc::new(state),
            drain_timeout,
        }
    }

    /// Development exits without a grace period; everything else waits
    /// [`DEFAULT_DRAIN_TIMEOUT`].
    pub fn for_environment(environment: Environment) -> Self {
        if environment.is_development() {
            Self::new(Duration::ZERO)
        } else {
            Self::new(DEFAULT_DRAIN_TIMEOUT)
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    pub fn drain_timeout(&self) -> Duration {
        self.drain_timeout
    }

    /// `running -> terminating`. Returns false if termination already began.
    pub fn terminate(&self) -> bool {
        self.advance(LifecycleState::Terminating)
    }

    /// Mark the process as fully shut down.
    pub fn finish(&self) -> bool {
        self.advance(LifecycleState::Shutdown)
    }

    fn advance(&self, next: LifecycleState) -> bool {
        self.state.send_if_modified(|current| {
            if *current < next {
                *current = next;
                true
            } else {
                false
            }
        })
    }

    /// Resolves once the state has left `running`.
    pub async fn terminated(self) {
        let mut state = self.state.subscribe();
        let _ = state
            .wait_for(|state| *state != LifecycleState::Running)
            .await;
    }

    /// `200 ok` while running, `503 terminating` afterwards.
    pub fn health_response(&self) -> Response {
        if self.is_running() {
            (StatusCode::OK, "ok").into_response()
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "terminating").into_response()
        }
    }

    /// Subscribe to SIGINT and SIGTERM once. The first signal starts
    /// termination; later ones are logged and ignored.
    pub fn listen_for_signals(&self) -> JoinHandle<()> {
        let terminator = self.clone();

        tokio::spawn(async move {
            loop {
                let signal = next_signal().await;
                if terminator.terminate() {
                    info!(
                        signal,
                        drain_timeout = ?terminator.drain_timeout,
                        "Received {}, initiating graceful shutdown",
                        signal
                    );
                } else {
                    warn!(signal, "Received {} while {}, ignoring", signal, terminator.state());
                }
            }
        })
    }
}

impl Default for Terminator {
    fn default() -> Self {
        Self::new(DEFAULT_DRAIN_TIMEOUT)
    }
}

async fn next_signal() -> &'static str {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    tokio::select! {
        signal = ctrl_c => signal,
        signal = terminate => signal,
    }
}
