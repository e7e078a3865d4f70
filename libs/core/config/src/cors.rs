use crate::{env_or_default, env_parse, ConfigError, FromEnv};

/// Raw cross-origin settings.
///
/// `origins` is either `*` or a comma-separated allow-list; it is parsed into a
/// policy by the HTTP layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    pub origins: String,
    pub credentials: bool,
}

impl CorsConfig {
    pub fn new(origins: impl Into<String>) -> Self {
        Self {
            origins: origins.into(),
            credentials: false,
        }
    }

    /// Allow-listed origins with blanks removed.
    pub fn origin_list(&self) -> Vec<String> {
        self.origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl FromEnv for CorsConfig {
    /// - CORS_ORIGINS: defaults to `*`
    /// - CORS_CREDENTIALS: defaults to false
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            origins: env_or_default("CORS_ORIGINS", "*"),
            credentials: env_parse("CORS_CREDENTIALS", false)?,
        })
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self::new("*")
    }
}
