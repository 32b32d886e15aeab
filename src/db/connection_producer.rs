use crate::db::connection_config::ConnectionConfig;
use crate::error::MockdbError;
use crate::types::config_map::{ConfigMap, ConfigValue, lookup_key};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;
use std::str::FromStr;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

pub type SqlitePool = Pool<Sqlite>;

pub const PASSWORD_REDACTION: &str = "[password]";

/// Observable lifecycle of a producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    /// Configuration accepted; no handle has been opened yet.
    Initialized,
    /// A live pool is held.
    Active,
}

/// Everything guarded by the producer's lock.
#[derive(Debug, Default)]
pub(crate) struct ConnectionState {
    pub(crate) config: ConnectionConfig,
    pub(crate) raw_config: ConfigMap,
    pub(crate) initialized: bool,
    pool: Option<SqlitePool>,
}

impl ConnectionState {
    /// Live handle, opening the pool on first use. The caller must already
    /// hold the producer lock.
    pub(crate) fn connection(&mut self) -> Result<SqlitePool, MockdbError> {
        if !self.initialized {
            return Err(MockdbError::NotInitialized);
        }
        if let Some(pool) = self.pool.as_ref() {
            return Ok(pool.clone());
        }

        let opts = SqliteConnectOptions::from_str(&self.config.render_url())
            .map_err(|e| MockdbError::Validation(format!("connection_url: {e}")))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(self.config.max_open_connections)
            .min_connections(0)
            .max_lifetime(self.config.max_connection_lifetime)
            .connect_lazy_with(opts);
        debug!(
            host = %self.config.host,
            max_open = self.config.max_open_connections,
            "connection pool created"
        );
        self.pool = Some(pool.clone());
        Ok(pool)
    }

    /// Close and forget the pool, if any. Initialization state is untouched.
    pub(crate) async fn release_handle(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            debug!(host = %self.config.host, "connection pool closed");
        }
    }

    /// Replace the root password in both the typed config and the raw bag.
    /// The bag keeps whichever key spelling the host used.
    pub(crate) fn set_password(&mut self, password: String) {
        let key = lookup_key(&self.raw_config, "password")
            .unwrap_or("password")
            .to_string();
        self.raw_config.insert(key, ConfigValue::String(password.clone()));
        self.config.password = password;
    }

    fn lifecycle(&self) -> Lifecycle {
        match (self.initialized, self.pool.is_some()) {
            (false, _) => Lifecycle::Uninitialized,
            (true, false) => Lifecycle::Initialized,
            (true, true) => Lifecycle::Active,
        }
    }
}

/// Owns the connection configuration and the SQLite handle.
///
/// A single mutex guards all of it. The plugin core takes the same lock via
/// [`ConnectionProducer::lock`] so that its whole operation is one critical
/// section.
#[derive(Debug, Default)]
pub struct ConnectionProducer {
    state: Mutex<ConnectionState>,
}

impl ConnectionProducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, ConnectionState> {
        self.state.lock().await
    }

    /// Decode, default, and validate `conf`, then mark the producer
    /// initialized. Returns the configuration the host should persist.
    pub async fn initialize(
        &self,
        conf: ConfigMap,
        verify_connection: bool,
    ) -> Result<ConfigMap, MockdbError> {
        let mut state = self.lock().await;

        state.initialized = false;
        state.release_handle().await;
        state.raw_config = conf;

        let config = ConnectionConfig::weak_decode(&state.raw_config)?;
        config.validate()?;
        state.config = config;

        // Fields are valid; the handle itself may be opened later.
        state.initialized = true;

        if verify_connection
            && let Err(e) = Self::verify(&mut state).await
        {
            warn!(host = %state.config.host, error = %e, "connection verification failed");
            state.initialized = false;
            state.release_handle().await;
            return Err(MockdbError::Execution(format!(
                "error verifying connection: {e}"
            )));
        }

        info!(
            host = %state.config.host,
            port = %state.config.port,
            verified = verify_connection,
            "connection producer initialized"
        );
        Ok(state.raw_config.clone())
    }

    async fn verify(state: &mut ConnectionState) -> Result<(), MockdbError> {
        let pool = state.connection()?;
        let conn = pool.acquire().await?;
        drop(conn);
        Ok(())
    }

    pub async fn connection(&self) -> Result<SqlitePool, MockdbError> {
        self.lock().await.connection()
    }

    /// Release the handle. Safe to call repeatedly; afterwards every
    /// operation fails until the next [`ConnectionProducer::initialize`].
    pub async fn close(&self) -> Result<(), MockdbError> {
        let mut state = self.lock().await;
        state.release_handle().await;
        if state.initialized {
            info!(host = %state.config.host, "connection producer closed");
        }
        state.initialized = false;
        Ok(())
    }

    pub async fn lifecycle(&self) -> Lifecycle {
        self.lock().await.lifecycle()
    }

    /// Secret strings and the token that replaces them in error text.
    pub async fn secret_values(&self) -> HashMap<String, String> {
        let state = self.lock().await;
        let mut secrets = HashMap::new();
        if !state.config.password.is_empty() {
            secrets.insert(state.config.password.clone(), PASSWORD_REDACTION.to_string());
        }
        secrets
    }
}
