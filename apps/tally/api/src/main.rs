use axum_helpers::{CorsPolicy, Terminator, serve};
use clap::Parser;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_events::{EventSchema, EventService, PgEventRepository};
use eyre::WrapErr;
use migration::Migrator;
use std::sync::Arc;
use tally_api::{AppState, Config, router};
use tracing::info;

#[derive(Parser)]
#[command(name = "tally_api")]
#[command(about = "Analytics event ingestion API")]
struct Cli {
    /// Apply pending migrations before accepting requests
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    init_tracing(&config.environment);
    observability::init_metrics().wrap_err("Failed to install metrics recorder")?;

    info!(
        name = %config.app.name,
        version = %config.app.version,
        environment = ?config.environment,
        "Starting service"
    );

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .wrap_err("PostgreSQL connection failed")?;

    if cli.migrate {
        database::postgres::run_migrations::<Migrator>(&db, &config.app.name)
            .await
            .wrap_err("Migration failed")?;
    }

    let schema = EventSchema::load(config.schema_path.as_deref())
        .wrap_err("Failed to load event schema")?;
    let events = Arc::new(EventService::new(PgEventRepository::new(db.clone()), schema));

    let terminator = Terminator::for_environment(config.environment);
    let state = AppState::new(
        config.app.clone(),
        events,
        terminator.clone(),
        config.public_dir.clone(),
    );
    let router = router(state, CorsPolicy::from_config(&config.cors))?;

    serve(router, &config.server, terminator, async move {
        database::postgres::close(db, "events").await;
    })
    .await
    .wrap_err("Server error")?;

    Ok(())
}
