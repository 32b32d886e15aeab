use crate::error::MockdbError;
use crate::types::UsernameConfig;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng};

const USERNAME_PREFIX: &str = "v";
const USERNAME_RANDOM_LEN: usize = 20;
const PASSWORD_PREFIX: &str = "A1a-";
const PASSWORD_RANDOM_LEN: usize = 16;
const EXPIRATION_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

/// Generates the identifiers handed out for a dynamic credential.
pub trait CredentialsProducer: Send + Sync {
    fn generate_username(&self, config: &UsernameConfig) -> Result<String, MockdbError>;
    fn generate_password(&self) -> Result<String, MockdbError>;
    fn generate_expiration(&self, expiration: DateTime<Utc>) -> Result<String, MockdbError>;
}

/// Username/password policy for SQL-style databases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlCredentialsProducer {
    /// Max characters kept from the display name; 0 drops it.
    pub display_name_len: usize,
    /// Max characters kept from the role name; 0 drops it.
    pub role_name_len: usize,
    /// Max total username length; 0 means unbounded.
    pub username_len: usize,
    pub separator: String,
}

impl Default for SqlCredentialsProducer {
    fn default() -> Self {
        Self {
            display_name_len: 15,
            role_name_len: 15,
            username_len: 100,
            separator: "_".to_string(),
        }
    }
}

impl SqlCredentialsProducer {
    fn slice(name: &str, max_len: usize) -> String {
        name.chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .take(max_len)
            .collect()
    }
}

impl CredentialsProducer for SqlCredentialsProducer {
    fn generate_username(&self, config: &UsernameConfig) -> Result<String, MockdbError> {
        let mut username = USERNAME_PREFIX.to_string();
        for part in [
            Self::slice(&config.display_name, self.display_name_len),
            Self::slice(&config.role_name, self.role_name_len),
        ] {
            if !part.is_empty() {
                username.push_str(&self.separator);
                username.push_str(&part);
            }
        }

        username.push_str(&self.separator);
        let random_start = username.len();
        if self.username_len > 0 && self.username_len <= random_start {
            return Err(MockdbError::Generation(format!(
                "username length {} leaves no room for a random suffix after {:?}",
                self.username_len, username
            )));
        }

        username.push_str(&random_alphanumeric(USERNAME_RANDOM_LEN)?);
        username.push_str(&self.separator);
        username.push_str(&Utc::now().timestamp().to_string());

        if self.username_len > 0 {
            // pop() removes whole chars, so a multi-byte separator is never split.
            while username.len() > self.username_len {
                username.pop();
            }
        }
        Ok(username)
    }

    fn generate_password(&self) -> Result<String, MockdbError> {
        let mut password = PASSWORD_PREFIX.to_string();
        password.push_str(&random_alphanumeric(PASSWORD_RANDOM_LEN)?);
        Ok(password)
    }

    fn generate_expiration(&self, expiration: DateTime<Utc>) -> Result<String, MockdbError> {
        Ok(expiration.format(EXPIRATION_FORMAT).to_string())
    }
}

/// Uniformly random ASCII alphanumerics, seeded from the OS entropy source.
fn random_alphanumeric(len: usize) -> Result<String, MockdbError> {
    let rng = StdRng::from_rng(OsRng)?;
    Ok(rng
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn username_has_prefix_and_respects_max_len() {
        let producer = SqlCredentialsProducer::default();
        let name = producer
            .generate_username(&UsernameConfig::new("app", "role"))
            .unwrap();
        assert!(name.starts_with("v_app_role_"), "{name}");
        assert!(name.len() <= 100);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn long_names_are_sliced_and_filtered() {
        let producer = SqlCredentialsProducer::default();
        let name = producer
            .generate_username(&UsernameConfig::new(
                "token-with spaces!and-more-than-fifteen",
                "r o l e",
            ))
            .unwrap();
        assert!(name.starts_with("v_token-withspace_role_"), "{name}");
    }

    #[test]
    fn usernames_differ_between_calls() {
        let producer = SqlCredentialsProducer::default();
        let cfg = UsernameConfig::new("app", "role");
        let a = producer.generate_username(&cfg).unwrap();
        let b = producer.generate_username(&cfg).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn total_length_is_truncated() {
        let producer = SqlCredentialsProducer {
            username_len: 16,
            ..Default::default()
        };
        let name = producer
            .generate_username(&UsernameConfig::new("app", "role"))
            .unwrap();
        assert_eq!(name.len(), 16);
        assert!(name.starts_with("v_app_role_"));
    }

    #[test]
    fn zero_slice_lengths_drop_names() {
        let producer = SqlCredentialsProducer {
            display_name_len: 0,
            role_name_len: 0,
            ..Default::default()
        };
        let name = producer
            .generate_username(&UsernameConfig::new("app", "role"))
            .unwrap();
        assert!(!name.contains("app"));
        assert!(!name.contains("role"));
        assert!(name.starts_with("v_"));
    }

    #[test]
    fn impossible_length_is_rejected() {
        let producer = SqlCredentialsProducer {
            username_len: 6,
            ..Default::default()
        };
        let err = producer
            .generate_username(&UsernameConfig::new("app", "role"))
            .unwrap_err();
        assert!(matches!(err, MockdbError::Generation(_)));
    }

    #[test]
    fn password_shape() {
        let producer = SqlCredentialsProducer::default();
        let pw = producer.generate_password().unwrap();
        assert_eq!(pw.len(), PASSWORD_PREFIX.len() + PASSWORD_RANDOM_LEN);
        assert!(pw.starts_with(PASSWORD_PREFIX));
        assert!(pw[PASSWORD_PREFIX.len()..].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(pw, producer.generate_password().unwrap());
    }

    #[test]
    fn expiration_format() {
        let producer = SqlCredentialsProducer::default();
        let t = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        assert_eq!(
            producer.generate_expiration(t).unwrap(),
            "2026-10-19 08:30:00+0000"
        );
    }
}
