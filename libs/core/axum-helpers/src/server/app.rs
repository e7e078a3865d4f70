use super::lifecycle::Terminator;
use axum::Router;
use core_config::server::ServerConfig;
use std::future::{Future, IntoFuture};
use std::io;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tracing::{error, info};

/// Bind the configured address and serve until the terminator fires.
///
/// After the first termination signal the process stays `terminating` for
/// the whole [`Terminator::drain_timeout`]: requests are still served, so
/// load balancers see `/healthz` answer 503 and stop routing here. Once the
/// grace period elapses the server stops unconditionally, `cleanup` runs
/// (e.g. closing the database pool) and the state becomes `shutdown`.
///
/// # Example
/// ```ignore
/// let terminator = Terminator::for_environment(environment);
/// serve(router, &config.server, terminator, async move {
///     database::postgres::close(db, "events").await;
/// })
/// .await?;
/// ```
pub async fn serve<F>(
    router: Router,
    server_config: &ServerConfig,
    terminator: Terminator,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(server_config.address()).await?;
    info!(
        "Server listening on {} (public url: {})",
        listener.local_addr()?,
        server_config.url
    );

    serve_with_listener(listener, router, terminator, cleanup).await
}

/// [`serve`] on an already bound listener.
pub async fn serve_with_listener<F>(
    listener: TcpListener,
    router: Router,
    terminator: Terminator,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let signals = terminator.listen_for_signals();

    let app = axum::serve(listener, router.into_make_service());
    let mut server = tokio::spawn(app.into_future());

    let finished = tokio::select! {
        joined = &mut server => Some(joined),
        _ = terminator.clone().terminated() => None,
    };

    let result = match finished {
        Some(joined) => flatten(joined),
        None => {
            let grace = terminator.drain_timeout();
            info!(grace_period = ?grace, "Termination requested, reporting unhealthy");

            let stopped = tokio::select! {
                joined = &mut server => Some(joined),
                _ = tokio::time::sleep(grace) => None,
            };

            match stopped {
                Some(joined) => flatten(joined),
                None => {
                    info!("Grace period of {:?} elapsed, stopping server", grace);
                    server.abort();
                    let _ = server.await;
                    Ok(())
                }
            }
        }
    };

    terminator.terminate();
    cleanup.await;
    terminator.finish();
    signals.abort();

    info!("Shutdown complete");
    result.inspect_err(|e| error!("Server encountered an error: {:?}", e))
}

fn flatten(joined: Result<io::Result<()>, JoinError>) -> io::Result<()> {
    joined.map_err(io::Error::other)?
}
