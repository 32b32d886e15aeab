//! Host-facing value types: the untyped configuration bag and the statement
//! and naming bundles passed into each lifecycle call.

pub mod config_map;
pub mod statements;

pub use config_map::{ConfigMap, ConfigValue, config_map_from_json};
pub use statements::{Statements, StaticUserConfig, UsernameConfig};
