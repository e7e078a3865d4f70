use crate::env_or_default;
use serde::Serialize;

/// Service identity reported by info endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

impl AppInfo {
    /// Build from compile-time defaults, overridable with `APP_NAME` / `APP_VERSION`.
    pub fn from_env_or(name: &str, version: &str) -> Self {
        Self {
            name: env_or_default("APP_NAME", name),
            version: env_or_default("APP_VERSION", version),
        }
    }
}

/// `AppInfo` for the calling crate, using its Cargo package name and version as defaults.
#[macro_export]
macro_rules! app_info {
    () => {
        $crate::AppInfo::from_env_or(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    };
}
