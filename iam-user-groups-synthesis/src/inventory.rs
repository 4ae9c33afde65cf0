//! Declarative inventory of requested IAM users and groups
//!
//! The inventory is the only input of the synthesizer. It is usually loaded
//! from a JSON document shaped like the users/groups module variables:
//!
//! ```json
//! {
//!   "users": [
//!     {"name": "test1@example.com", "enforce_mfa": "yes", "include_login_profile": "yes"}
//!   ],
//!   "groups": [
//!     {"name": "admins", "users": ["test1@example.com"], "assumable_roles": []}
//!   ]
//! }
//! ```
//!
//! Boolean flags accept either JSON booleans or the strings `"yes"`/`"no"`.

use std::io::Read;
use std::path::Path;

use log::debug;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::{SynthesisError, SynthesisResult};

pub const DEFAULT_PASSWORD_LENGTH: u32 = 32;

/// One requested IAM user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSpec {
    pub name: String,
    #[serde(default = "default_true", deserialize_with = "deserialize_flag")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub enforce_mfa: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub include_login_profile: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub include_access_key: bool,
    #[serde(default = "default_password_length")]
    pub password_length: u32,
}

impl UserSpec {
    /// An enabled user with no credentials and MFA not enforced.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            enforce_mfa: false,
            include_login_profile: false,
            include_access_key: false,
            password_length: DEFAULT_PASSWORD_LENGTH,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_enforce_mfa(mut self, enforce_mfa: bool) -> Self {
        self.enforce_mfa = enforce_mfa;
        self
    }

    pub fn with_login_profile(mut self, include: bool) -> Self {
        self.include_login_profile = include;
        self
    }

    pub fn with_access_key(mut self, include: bool) -> Self {
        self.include_access_key = include;
        self
    }

    pub fn with_password_length(mut self, length: u32) -> Self {
        self.password_length = length;
        self
    }

    /// Whether synthesis must produce a secret for this user.
    pub fn requires_credentials(&self) -> bool {
        self.enabled && (self.include_login_profile || self.include_access_key)
    }
}

/// One requested IAM group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    pub name: String,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub policies: Vec<String>,
    #[serde(default)]
    pub assumable_roles: Vec<String>,
}

impl GroupSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users = users.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_policies<I, S>(mut self, policies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policies = policies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_assumable_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assumable_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Member names with repeats removed, first occurrence wins.
    pub fn distinct_users(&self) -> Vec<String> {
        distinct(&self.users)
    }

    pub fn distinct_policies(&self) -> Vec<String> {
        distinct(&self.policies)
    }

    pub fn distinct_assumable_roles(&self) -> Vec<String> {
        distinct(&self.assumable_roles)
    }
}

/// Full set of requested users and groups for one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Inventory {
    #[serde(default)]
    pub users: Vec<UserSpec>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

impl Inventory {
    pub fn new(users: Vec<UserSpec>, groups: Vec<GroupSpec>) -> Self {
        Self { users, groups }
    }

    pub fn from_json_str(json: &str) -> SynthesisResult<Self> {
        let inventory: Self = serde_json::from_str(json)?;
        debug!(
            "Parsed inventory with {} users and {} groups",
            inventory.users.len(),
            inventory.groups.len()
        );
        Ok(inventory)
    }

    pub fn from_reader(mut reader: impl Read) -> SynthesisResult<Self> {
        let mut buf = String::new();
        reader
            .read_to_string(&mut buf)
            .map_err(|e| SynthesisError::file_system("read", "<stdin>", e))?;
        Self::from_json_str(&buf)
    }

    pub fn from_path(path: &Path) -> SynthesisResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SynthesisError::file_system("read", path, e))?;
        Self::from_json_str(&content)
    }

    pub fn user(&self, name: &str) -> Option<&UserSpec> {
        self.users.iter().find(|u| u.name == name)
    }

    pub fn enabled_users(&self) -> impl Iterator<Item = &UserSpec> {
        self.users.iter().filter(|u| u.enabled)
    }
}

fn distinct(values: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .cloned()
        .collect()
}

const fn default_true() -> bool {
    true
}

const fn default_password_length() -> u32 {
    DEFAULT_PASSWORD_LENGTH
}

/// Accepts `true`/`false` as well as the `"yes"`/`"no"` strings of the
/// module variables.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a boolean or one of \"yes\", \"no\", \"true\", \"false\"")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v.trim().to_ascii_lowercase().as_str() {
                "yes" | "true" => Ok(true),
                "no" | "false" => Ok(false),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}
