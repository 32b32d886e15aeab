use crate::db::ConnectionProducer;
use crate::db::connection_producer::Lifecycle;
use crate::db::statements::{
    DEFAULT_ROOT_ROTATION, DEFAULT_USER_DELETION, execute_all, execute_in_transaction,
};
use crate::error::MockdbError;
use crate::middleware::error_sanitizer::ErrorSanitizer;
use crate::service::credentials::{CredentialsProducer, SqlCredentialsProducer};
use crate::service::database::{Database, SecretValues};
use crate::types::{ConfigMap, Statements, StaticUserConfig, UsernameConfig};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub const MOCKDB_TYPE_NAME: &str = "mockdb";

/// Dynamic-credential plugin core.
///
/// Every state-changing operation runs under the connection producer's lock,
/// so the handle and the root credentials are never seen half-updated.
pub struct Mockdb {
    producer: ConnectionProducer,
    credentials: Box<dyn CredentialsProducer>,
}

impl Default for Mockdb {
    fn default() -> Self {
        Self::new()
    }
}

impl Mockdb {
    pub fn new() -> Self {
        Self::with_credentials_producer(SqlCredentialsProducer::default())
    }

    pub fn with_credentials_producer(credentials: impl CredentialsProducer + 'static) -> Self {
        Self {
            producer: ConnectionProducer::new(),
            credentials: Box::new(credentials),
        }
    }

    /// Build the plugin as the host should see it: wrapped in the error
    /// sanitizer.
    pub fn sanitized() -> ErrorSanitizer<Mockdb> {
        ErrorSanitizer::new(Self::new())
    }

    pub async fn lifecycle(&self) -> Lifecycle {
        self.producer.lifecycle().await
    }

    /// SQLite has no per-user sessions to terminate; the step is kept so the
    /// ordering disconnect-then-revoke holds for every revocation.
    async fn disconnect_sessions(
        _conn: &mut SqliteConnection,
        username: &str,
    ) -> Result<(), MockdbError> {
        debug!(username, "no live sessions to disconnect");
        Ok(())
    }
}

#[async_trait]
impl Database for Mockdb {
    fn type_name(&self) -> &'static str {
        MOCKDB_TYPE_NAME
    }

    async fn initialize(
        &self,
        config: ConfigMap,
        verify_connection: bool,
    ) -> Result<ConfigMap, MockdbError> {
        self.producer.initialize(config, verify_connection).await
    }

    async fn create_user(
        &self,
        statements: Statements,
        username_config: UsernameConfig,
        expiration: DateTime<Utc>,
    ) -> Result<(String, String), MockdbError> {
        let statements = statements.compat();
        if statements.creation.is_empty() {
            return Err(MockdbError::EmptyCreationStatement);
        }

        let mut state = self.producer.lock().await;

        let username = self.credentials.generate_username(&username_config)?;
        let password = self.credentials.generate_password()?;
        let expiration = self.credentials.generate_expiration(expiration)?;

        let pool = state.connection()?;
        let bindings = [
            ("name", username.as_str()),
            ("username", username.as_str()),
            ("password", password.as_str()),
            ("expiration", expiration.as_str()),
        ];
        execute_in_transaction(&pool, &statements.creation, &bindings)
            .await
            .inspect_err(|e| warn!(username = %username, error = %e, "user creation rolled back"))?;

        info!(username = %username, expiration = %expiration, "user created");
        Ok((username, password))
    }

    async fn renew_user(
        &self,
        _statements: Statements,
        _username: &str,
        _expiration: DateTime<Utc>,
    ) -> Result<(), MockdbError> {
        Ok(())
    }

    async fn revoke_user(
        &self,
        statements: Statements,
        username: &str,
    ) -> Result<(), MockdbError> {
        let mut state = self.producer.lock().await;

        let pool = state.connection()?;
        let mut conn = pool.acquire().await?;

        Self::disconnect_sessions(&mut conn, username).await?;

        let statements = statements.compat();
        let revocation = if statements.revocation.is_empty() {
            vec![DEFAULT_USER_DELETION.to_string()]
        } else {
            statements.revocation
        };

        // User removal is DDL that commits on its own, so no transaction.
        let bindings = [("name", username), ("username", username)];
        execute_all(&mut conn, &revocation, &bindings).await?;

        info!(username, "user revoked");
        Ok(())
    }

    async fn rotate_root_credentials(
        &self,
        statements: Vec<String>,
    ) -> Result<ConfigMap, MockdbError> {
        let mut state = self.producer.lock().await;

        if state.config.username.is_empty() || state.config.password.is_empty() {
            return Err(MockdbError::MissingRootCredentials);
        }

        let rotation = if statements.is_empty() {
            vec![DEFAULT_ROOT_ROTATION.to_string()]
        } else {
            statements
        };

        let pool = state.connection()?;
        let password = self.credentials.generate_password()?;

        let username = state.config.username.clone();
        let bindings = [
            ("name", username.as_str()),
            ("username", username.as_str()),
            ("password", password.as_str()),
        ];
        execute_in_transaction(&pool, &rotation, &bindings)
            .await
            .inspect_err(|e| warn!(username = %username, error = %e, "root rotation rolled back"))?;

        // Pooled connections were opened with the old password.
        state.release_handle().await;
        state.set_password(password);

        info!(username = %username, "root credentials rotated");
        Ok(state.raw_config.clone())
    }

    async fn set_credentials(
        &self,
        _statements: Statements,
        _static_user: StaticUserConfig,
    ) -> Result<(String, String), MockdbError> {
        Err(MockdbError::Unimplemented)
    }

    async fn close(&self) -> Result<(), MockdbError> {
        self.producer.close().await
    }
}

#[async_trait]
impl SecretValues for Mockdb {
    async fn secret_values(&self) -> HashMap<String, String> {
        self.producer.secret_values().await
    }
}
