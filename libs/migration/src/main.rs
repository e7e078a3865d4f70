use clap::{Parser, ValueEnum};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use database::postgres::{self, PostgresConfig};
use eyre::{Result, WrapErr};
use migration::Migrator;

#[derive(Parser)]
#[command(name = "migration")]
#[command(about = "Apply or roll back the events schema")]
struct Cli {
    #[arg(value_enum)]
    direction: Direction,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Direction {
    /// Apply every pending migration
    Up,
    /// Roll back every applied migration
    Down,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    let cli = Cli::parse();
    init_tracing(&Environment::from_env());

    let config = PostgresConfig::from_env().wrap_err("Invalid database configuration")?;
    let db = postgres::connect_from_config_with_retry(config, None)
        .await
        .wrap_err("Database connection failed")?;

    let result = match cli.direction {
        Direction::Up => postgres::run_migrations::<Migrator>(&db, "events").await,
        Direction::Down => postgres::rollback_migrations::<Migrator>(&db, "events").await,
    };
    postgres::close(db, "migration").await;

    result.wrap_err("Migration failed")
}
