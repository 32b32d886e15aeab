pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod service;
pub mod types;

pub use error::{ErrorKind, MockdbError};
pub use middleware::ErrorSanitizer;
pub use service::{Database, Mockdb};
