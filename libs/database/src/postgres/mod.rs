//! PostgreSQL connector
//!
//! Connection pool setup, startup retry, and migration running.

mod config;
mod connector;

pub use config::PostgresConfig;
pub use connector::{
    close, connect, connect_from_config, connect_from_config_with_retry, rollback_migrations,
    run_migrations,
};

// Re-export SeaORM types for convenience
pub use sea_orm::{ConnectOptions, DatabaseConnection, DbErr};
pub use sea_orm_migration::MigratorTrait;
