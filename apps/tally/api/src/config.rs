use core_config::{AppInfo, FromEnv, app_info, cors::CorsConfig, server::ServerConfig};
use database::postgres::PostgresConfig;
use std::path::PathBuf;

pub use core_config::Environment;

pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub cors: CorsConfig,
    /// JSON Schema override; the bundled schema is used when unset
    pub schema_path: Option<PathBuf>,
    /// Root of the static assets served for unmatched GETs
    pub public_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let database = PostgresConfig::from_env()?; // Required - will fail if not set
        let cors = CorsConfig::from_env()?;

        let schema_path = std::env::var("EVENT_SCHEMA_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);
        let public_dir = PathBuf::from(core_config::env_or_default(
            "PUBLIC_DIR",
            DEFAULT_PUBLIC_DIR,
        ));

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            database,
            cors,
            schema_path,
            public_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/tally")),
                ("APP_ENV", None),
                ("APP_NAME", None),
                ("PORT", None),
                ("CORS_ORIGINS", None),
                ("EVENT_SCHEMA_PATH", None),
                ("PUBLIC_DIR", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app.name, "tally_api");
                assert_eq!(config.environment, Environment::Production);
                assert_eq!(config.server.port, 8000);
                assert_eq!(config.cors.origins, "*");
                assert!(config.schema_path.is_none());
                assert_eq!(config.public_dir, PathBuf::from("public"));
            },
        );
    }

    #[test]
    fn test_config_overrides() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/tally")),
                ("APP_ENV", Some("Development")),
                ("CORS_ORIGINS", Some("https://a.example, https://b.example")),
                ("EVENT_SCHEMA_PATH", Some("/etc/tally/schema.json")),
                ("PUBLIC_DIR", Some("/srv/tally")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.environment.is_development());
                assert_eq!(config.cors.origin_list().len(), 2);
                assert_eq!(
                    config.schema_path,
                    Some(PathBuf::from("/etc/tally/schema.json"))
                );
                assert_eq!(config.public_dir, PathBuf::from("/srv/tally"));
            },
        );
    }

    #[test]
    fn test_config_requires_database_url() {
        temp_env::with_var_unset("DATABASE_URL", || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("DATABASE_URL"));
        });
    }
}
