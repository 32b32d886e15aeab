use crate::types::ConfigMap;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Process-level settings for the plugin binary.
///
/// Read from `MOCKDB_*` environment variables (after `.env` is loaded).
/// Nested keys use `__`, so `MOCKDB_CONNECTION__HOST=db1` sets
/// `connection.host`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub loglevel: String,
    pub verify_connection: bool,
    /// Passed to `initialize` verbatim.
    pub connection: ConfigMap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
            verify_connection: true,
            connection: ConfigMap::new(),
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("MOCKDB_").split("__"))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::load().expect("FATAL: invalid MOCKDB_* configuration"));
