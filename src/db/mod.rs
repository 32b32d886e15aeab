//! Database module: connection handling and statement execution.
//!
//! Layout:
//! - `connection_config.rs`: typed view of the host's config bag
//! - `connection_producer.rs`: the locked owner of config and SQLite pool
//! - `statements.rs`: default templates, splitting, substitution, execution

pub mod connection_config;
pub mod connection_producer;
pub mod statements;

pub use connection_config::ConnectionConfig;
pub use connection_producer::{ConnectionProducer, Lifecycle, SqlitePool};
