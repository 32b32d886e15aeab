use crate::error::MockdbError;
use crate::types::config_map::{ConfigMap, ConfigValue, lookup};
use std::time::Duration;

pub const DEFAULT_PORT: &str = "8086";
pub const DEFAULT_CONNECTION_URL: &str = "sqlite://{{host}}";
pub const DEFAULT_MAX_OPEN_CONNECTIONS: u32 = 4;

/// Typed view of the connection settings held in the host's config bag.
#[derive(Clone, Default, PartialEq)]
pub struct ConnectionConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub port: String,
    pub connection_url: String,
    pub max_open_connections: u32,
    /// Accepted and clamped for hosts that send it. sqlx pools have no idle
    /// cap, so it is not applied to the pool.
    pub max_idle_connections: u32,
    pub max_connection_lifetime: Option<Duration>,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"[password]")
            .field("port", &self.port)
            .field("max_open_connections", &self.max_open_connections)
            .field("max_idle_connections", &self.max_idle_connections)
            .field("max_connection_lifetime", &self.max_connection_lifetime)
            .finish()
    }
}

impl ConnectionConfig {
    /// Permissively decode the raw bag. Missing keys take their defaults;
    /// values of the wrong primitive type are coerced where that is lossless.
    pub fn weak_decode(raw: &ConfigMap) -> Result<Self, MockdbError> {
        let string = |key: &str| lookup(raw, key).map(ConfigValue::coerce_string).unwrap_or_default();
        let count = |key: &str| -> Result<u32, MockdbError> {
            match lookup(raw, key) {
                None => Ok(0),
                Some(v) => v.coerce_u32().ok_or_else(|| {
                    MockdbError::Validation(format!("{key}: cannot decode {v:?} as a count"))
                }),
            }
        };

        let mut cfg = ConnectionConfig {
            host: string("host"),
            username: string("username"),
            password: string("password"),
            port: string("port"),
            connection_url: string("connection_url"),
            max_open_connections: count("max_open_connections")?,
            max_idle_connections: count("max_idle_connections")?,
            max_connection_lifetime: match lookup(raw, "max_connection_lifetime") {
                None => None,
                Some(v) => parse_duration(v)?,
            },
        };

        if cfg.port.is_empty() {
            cfg.port = DEFAULT_PORT.to_string();
        }
        if cfg.connection_url.is_empty() {
            cfg.connection_url = DEFAULT_CONNECTION_URL.to_string();
        }
        if cfg.max_open_connections == 0 {
            cfg.max_open_connections = DEFAULT_MAX_OPEN_CONNECTIONS;
        }
        if cfg.max_idle_connections == 0 || cfg.max_idle_connections > cfg.max_open_connections {
            cfg.max_idle_connections = cfg.max_open_connections;
        }
        Ok(cfg)
    }

    /// Required fields are checked in a fixed order so the first missing one
    /// is the one reported.
    pub fn validate(&self) -> Result<(), MockdbError> {
        let required = [
            ("host", &self.host),
            ("username", &self.username),
            ("password", &self.password),
        ];
        match required.iter().find(|(_, value)| value.is_empty()) {
            Some((field, _)) => Err(MockdbError::Validation(format!("{field} cannot be empty"))),
            None => Ok(()),
        }
    }

    /// The connection URL with credentials and address substituted in. The
    /// result contains the password and must never be logged.
    pub fn render_url(&self) -> String {
        self.connection_url
            .replace("{{username}}", &self.username)
            .replace("{{password}}", &self.password)
            .replace("{{host}}", &self.host)
            .replace("{{port}}", &self.port)
    }
}

/// Integer seconds, or a number with an `s`, `m` or `h` suffix. Zero means
/// no limit.
fn parse_duration(value: &ConfigValue) -> Result<Option<Duration>, MockdbError> {
    let invalid = || {
        MockdbError::Validation(format!(
            "max_connection_lifetime: cannot decode {value:?} as a duration"
        ))
    };
    let secs = match value {
        ConfigValue::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0
            } else {
                let (digits, unit) = match s.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
                    Some((idx, _)) => s.split_at(idx),
                    None => (s, "s"),
                };
                let n: u64 = digits.parse().map_err(|_| invalid())?;
                match unit {
                    "s" => n,
                    "m" => n.checked_mul(60).ok_or_else(invalid)?,
                    "h" => n.checked_mul(3600).ok_or_else(invalid)?,
                    _ => return Err(invalid()),
                }
            }
        }
        other => u64::from(other.coerce_u32().ok_or_else(invalid)?),
    };
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, ConfigValue)]) -> ConfigMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn defaults_are_applied() {
        let cfg = ConnectionConfig::weak_decode(&raw(&[
            ("host", "db1".into()),
            ("username", "root".into()),
            ("password", "pw".into()),
            ("port", "".into()),
        ]))
        .unwrap();
        assert_eq!(cfg.port, "8086");
        assert_eq!(cfg.connection_url, DEFAULT_CONNECTION_URL);
        assert_eq!(cfg.max_open_connections, DEFAULT_MAX_OPEN_CONNECTIONS);
        assert_eq!(cfg.max_idle_connections, DEFAULT_MAX_OPEN_CONNECTIONS);
        assert_eq!(cfg.max_connection_lifetime, None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn numeric_values_are_coerced() {
        let cfg = ConnectionConfig::weak_decode(&raw(&[
            ("port", ConfigValue::Int(5432)),
            ("max_open_connections", "2".into()),
            ("max_idle_connections", ConfigValue::Int(9)),
            ("max_connection_lifetime", "5m".into()),
        ]))
        .unwrap();
        assert_eq!(cfg.port, "5432");
        assert_eq!(cfg.max_open_connections, 2);
        assert_eq!(cfg.max_idle_connections, 2);
        assert_eq!(cfg.max_connection_lifetime, Some(Duration::from_secs(300)));
    }

    #[test]
    fn undecodable_values_are_validation_errors() {
        let err = ConnectionConfig::weak_decode(&raw(&[("max_open_connections", "lots".into())]))
            .unwrap_err();
        assert!(matches!(err, MockdbError::Validation(_)));
        let err = ConnectionConfig::weak_decode(&raw(&[("max_connection_lifetime", "3d".into())]))
            .unwrap_err();
        assert!(matches!(err, MockdbError::Validation(_)));
    }

    #[test]
    fn oversized_lifetime_is_a_validation_error() {
        for huge in ["9999999999999999999h", "9999999999999999999m"] {
            let err =
                ConnectionConfig::weak_decode(&raw(&[("max_connection_lifetime", huge.into())]))
                    .unwrap_err();
            assert!(matches!(err, MockdbError::Validation(_)), "{huge}");
        }
        let cfg = ConnectionConfig::weak_decode(&raw(&[(
            "max_connection_lifetime",
            "18446744073709551615".into(),
        )]))
        .unwrap();
        assert_eq!(cfg.max_connection_lifetime, Some(Duration::from_secs(u64::MAX)));
    }

    #[test]
    fn validation_reports_first_missing_field() {
        let cases = [
            (raw(&[("username", "u".into()), ("password", "p".into())]), "host"),
            (raw(&[("host", "h".into())]), "username"),
            (raw(&[("host", "h".into()), ("username", "u".into())]), "password"),
        ];
        for (bag, field) in cases {
            let err = ConnectionConfig::weak_decode(&bag).unwrap().validate().unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("invalid configuration: {field} cannot be empty")
            );
        }
    }

    #[test]
    fn url_template_is_rendered() {
        let cfg = ConnectionConfig::weak_decode(&raw(&[
            ("host", "db1".into()),
            ("username", "root".into()),
            ("password", "pw".into()),
            ("connection_url", "sqlite:/tmp/{{host}}-{{username}}-{{port}}.db".into()),
        ]))
        .unwrap();
        assert_eq!(cfg.render_url(), "sqlite:/tmp/db1-root-8086.db");
    }

    #[test]
    fn debug_hides_password() {
        let cfg = ConnectionConfig {
            password: "hunter2".into(),
            ..Default::default()
        };
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }
}
