use sqlx::Error as SqlxError;
use std::collections::HashMap;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum MockdbError {
    #[error("invalid configuration: {0}")]
    Validation(String),

    #[error("connection has not been initialized")]
    NotInitialized,

    #[error("empty creation statements")]
    EmptyCreationStatement,

    #[error("username and password are required to rotate")]
    MissingRootCredentials,

    #[error("credential generation failed: {0}")]
    Generation(String),

    #[error("database error: {0}")]
    Execution(String),

    #[error("plugin does not implement this operation")]
    Unimplemented,
}

/// Coarse classification of a failure as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before anything touched the database.
    Rejected,
    /// Work was attempted against the database and failed; any open
    /// transaction was rolled back.
    Failed,
    /// The capability does not exist for this database type.
    Unsupported,
}

impl MockdbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MockdbError::Validation(_)
            | MockdbError::NotInitialized
            | MockdbError::EmptyCreationStatement
            | MockdbError::MissingRootCredentials
            | MockdbError::Generation(_) => ErrorKind::Rejected,
            MockdbError::Execution(_) => ErrorKind::Failed,
            MockdbError::Unimplemented => ErrorKind::Unsupported,
        }
    }

    /// Replace every occurrence of a known secret in the error text with its
    /// redaction token. The variant is kept so callers can still match on it.
    pub fn redact(self, secrets: &HashMap<String, String>) -> Self {
        let scrub = |mut text: String| {
            for (secret, token) in secrets {
                if !secret.is_empty() {
                    text = text.replace(secret.as_str(), token);
                }
            }
            text
        };
        match self {
            MockdbError::Validation(msg) => MockdbError::Validation(scrub(msg)),
            MockdbError::Generation(msg) => MockdbError::Generation(scrub(msg)),
            MockdbError::Execution(msg) => MockdbError::Execution(scrub(msg)),
            other => other,
        }
    }
}

impl From<SqlxError> for MockdbError {
    fn from(e: SqlxError) -> Self {
        MockdbError::Execution(e.to_string())
    }
}

impl From<rand::Error> for MockdbError {
    fn from(e: rand::Error) -> Self {
        MockdbError::Generation(format!("entropy source failure: {e}"))
    }
}
