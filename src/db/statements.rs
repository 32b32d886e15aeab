//! Statement templating and execution against the SQLite handle.

use crate::db::connection_producer::SqlitePool;
use crate::error::MockdbError;
use sqlx::SqliteConnection;
use tracing::{debug, warn};

pub const DEFAULT_USER_CREATION: &str = r#"CREATE USER "{{username}}" WITH PASSWORD '{{password}}';"#;
pub const DEFAULT_USER_DELETION: &str = r#"DROP USER "{{username}}";"#;
pub const DEFAULT_ROOT_ROTATION: &str = r#"SET PASSWORD FOR "{{username}}" = '{{password}}';"#;

/// Values substituted into `{{key}}` placeholders.
pub type Bindings<'a> = [(&'a str, &'a str)];

/// Split every statement on `;`, trim, and drop empty fragments.
pub fn fragments(statements: &[String]) -> impl Iterator<Item = &str> {
    statements
        .iter()
        .flat_map(|stmt| stmt.split(';'))
        .map(str::trim)
        .filter(|q| !q.is_empty())
}

pub fn render(query: &str, bindings: &Bindings<'_>) -> String {
    bindings
        .iter()
        .fold(query.to_string(), |q, (key, value)| {
            q.replace(&format!("{{{{{key}}}}}"), value)
        })
}

/// Execute every fragment of `statements` on one connection, stopping at the
/// first failure. Callers decide whether `conn` is a transaction.
pub async fn execute_all(
    conn: &mut SqliteConnection,
    statements: &[String],
    bindings: &Bindings<'_>,
) -> Result<u64, MockdbError> {
    let mut executed = 0;
    for fragment in fragments(statements) {
        let query = render(fragment, bindings);
        sqlx::query(&query).execute(&mut *conn).await?;
        executed += 1;
    }
    debug!(executed, "statements executed");
    Ok(executed)
}

/// Run all fragments in one transaction: commit if every fragment succeeds,
/// otherwise roll back and return the execution error.
pub async fn execute_in_transaction(
    pool: &SqlitePool,
    statements: &[String],
    bindings: &Bindings<'_>,
) -> Result<u64, MockdbError> {
    // Dropping `tx` without commit (e.g. on cancellation) also rolls back.
    let mut tx = pool.begin().await?;
    match execute_all(&mut tx, statements, bindings).await {
        Ok(executed) => {
            tx.commit().await?;
            Ok(executed)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "transaction rollback failed");
            }
            Err(e)
        }
    }
}
