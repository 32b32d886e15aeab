use crate::error::MockdbError;
use crate::types::{ConfigMap, Statements, StaticUserConfig, UsernameConfig};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// The operations a secrets host invokes on a database plugin.
///
/// Dropping any returned future cancels the call: locks are released and an
/// open transaction is rolled back.
#[async_trait]
pub trait Database: Send + Sync {
    /// Fixed plugin type name.
    fn type_name(&self) -> &'static str;

    /// Validate and store connection configuration. The returned map is what
    /// the host must persist.
    async fn initialize(
        &self,
        config: ConfigMap,
        verify_connection: bool,
    ) -> Result<ConfigMap, MockdbError>;

    /// Create a new user and return its `(username, password)`.
    async fn create_user(
        &self,
        statements: Statements,
        username_config: UsernameConfig,
        expiration: DateTime<Utc>,
    ) -> Result<(String, String), MockdbError>;

    async fn renew_user(
        &self,
        statements: Statements,
        username: &str,
        expiration: DateTime<Utc>,
    ) -> Result<(), MockdbError>;

    async fn revoke_user(&self, statements: Statements, username: &str)
    -> Result<(), MockdbError>;

    /// Rotate the plugin's own root password. On success the returned map
    /// carries the new password and must be persisted by the host; if that
    /// fails, the database already uses the new password.
    async fn rotate_root_credentials(
        &self,
        statements: Vec<String>,
    ) -> Result<ConfigMap, MockdbError>;

    /// Set the password of an existing, externally named user.
    async fn set_credentials(
        &self,
        statements: Statements,
        static_user: StaticUserConfig,
    ) -> Result<(String, String), MockdbError>;

    async fn close(&self) -> Result<(), MockdbError>;
}

/// Source of the secret strings that must never leave the plugin in an
/// error message, mapped to their replacement text.
#[async_trait]
pub trait SecretValues: Send + Sync {
    async fn secret_values(&self) -> HashMap<String, String>;
}
