pub mod credentials;
pub mod database;
pub mod mockdb;

pub use credentials::{CredentialsProducer, SqlCredentialsProducer};
pub use database::{Database, SecretValues};
pub use mockdb::{MOCKDB_TYPE_NAME, Mockdb};
