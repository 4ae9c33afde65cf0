//! Explicit evaluation context passed into the synthesizer

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::arn::{is_account_id, is_partition, mfa_arn, user_arn};
use crate::error::{SynthesisError, SynthesisResult};

pub const DEFAULT_PARTITION: &str = "aws";

/// Account and partition the IAM entities are created in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsContext {
    partition: String,
    account_id: String,
}

impl AwsContext {
    pub fn new(partition: impl Into<String>, account_id: impl Into<String>) -> SynthesisResult<Self> {
        let partition = partition.into();
        let account_id = account_id.into();
        if !is_partition(&partition) {
            return Err(SynthesisError::configuration_at(
                "partition",
                format!("invalid partition '{partition}'"),
            ));
        }
        if !is_account_id(&account_id) {
            return Err(SynthesisError::configuration_at(
                "account_id",
                format!("account id must be 12 digits, got '{account_id}'"),
            ));
        }
        Ok(Self {
            partition,
            account_id,
        })
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn user_arn(&self, user_name: &str) -> String {
        user_arn(&self.partition, &self.account_id, user_name)
    }

    pub fn mfa_arn(&self, user_name: &str) -> String {
        mfa_arn(&self.partition, &self.account_id, user_name)
    }
}

/// Operator public key under which generated secrets are encrypted by the
/// provisioning engine. Held as the strict base64 encoding of the key file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PgpKey(String);

impl PgpKey {
    pub fn from_bytes(key: &[u8]) -> SynthesisResult<Self> {
        if key.iter().all(u8::is_ascii_whitespace) {
            return Err(SynthesisError::configuration_at(
                "pgp_key",
                "public key is empty",
            ));
        }
        Ok(Self(STANDARD.encode(key)))
    }

    pub fn from_path(path: &Path) -> SynthesisResult<Self> {
        let bytes =
            std::fs::read(path).map_err(|e| SynthesisError::file_system("read", path, e))?;
        Self::from_bytes(&bytes)
    }

    pub fn as_base64(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PgpKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PgpKey({} base64 chars)", self.0.len())
    }
}

/// How group members missing from the user inventory are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipCheck {
    /// Log a warning and leave the failure to the provisioning engine.
    #[default]
    Lenient,
    /// Reject the inventory with a configuration error.
    Strict,
}

#[derive(Debug, Clone, Default)]
pub struct SynthesisOptions {
    pub pgp_key: Option<PgpKey>,
    pub membership_check: MembershipCheck,
}

impl SynthesisOptions {
    pub fn with_pgp_key(mut self, key: PgpKey) -> Self {
        self.pgp_key = Some(key);
        self
    }

    pub fn with_membership_check(mut self, check: MembershipCheck) -> Self {
        self.membership_check = check;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_context_validation() {
        assert!(AwsContext::new("aws", "123456789012").is_ok());
        assert!(AwsContext::new("aws-us-gov", "123456789012").is_ok());

        let err = AwsContext::new("aws", "1234").unwrap_err();
        assert_eq!(err.field(), Some("account_id"));

        let err = AwsContext::new("", "123456789012").unwrap_err();
        assert_eq!(err.field(), Some("partition"));
    }

    #[test]
    fn test_context_arns() {
        let ctx = AwsContext::new("aws", "123456789012").unwrap();
        assert_eq!(ctx.user_arn("a"), "arn:aws:iam::123456789012:user/a");
        assert_eq!(ctx.mfa_arn("a"), "arn:aws:iam::123456789012:mfa/a");
    }

    #[test]
    fn test_pgp_key_is_strict_base64_of_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"mQENBFakeKey==\n").unwrap();

        let key = PgpKey::from_path(file.path()).unwrap();
        assert_eq!(key.as_base64(), STANDARD.encode(b"mQENBFakeKey==\n"));
        assert!(!format!("{key:?}").contains(key.as_base64()));
    }

    #[test]
    fn test_empty_pgp_key_rejected() {
        assert!(PgpKey::from_bytes(b"  \n").is_err());
    }
}
