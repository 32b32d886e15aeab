use serde::{Deserialize, Serialize};

/// Statement templates supplied by the host for each lifecycle operation.
///
/// The single-string `*_statements` fields are the older wire shape; call
/// [`Statements::compat`] before reading the list fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statements {
    pub creation: Vec<String>,
    pub revocation: Vec<String>,
    pub rollback: Vec<String>,
    pub renewal: Vec<String>,
    pub rotation: Vec<String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub creation_statements: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub revocation_statements: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rollback_statements: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub renew_statements: String,
}

impl Statements {
    pub fn with_creation(creation: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            creation: creation.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_revocation(revocation: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            revocation: revocation.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Fold the legacy single-string fields into the list fields. A list that
    /// is already populated wins.
    pub fn compat(mut self) -> Self {
        fn fold(list: &mut Vec<String>, legacy: &mut String) {
            let legacy = std::mem::take(legacy);
            if list.is_empty() && !legacy.is_empty() {
                list.push(legacy);
            }
        }
        fold(&mut self.creation, &mut self.creation_statements);
        fold(&mut self.revocation, &mut self.revocation_statements);
        fold(&mut self.rollback, &mut self.rollback_statements);
        fold(&mut self.renewal, &mut self.renew_statements);
        self
    }
}

/// Naming hints for a generated username.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernameConfig {
    pub display_name: String,
    pub role_name: String,
}

impl UsernameConfig {
    pub fn new(display_name: impl Into<String>, role_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            role_name: role_name.into(),
        }
    }
}

/// A pre-existing account whose password the host wants managed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticUserConfig {
    pub username: String,
    pub password: String,
}
