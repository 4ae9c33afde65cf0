//! ARN construction and validation for IAM entities

use regex::Regex;
use std::sync::OnceLock;

use crate::context::DEFAULT_PARTITION;

fn account_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{12}$").expect("valid regex"))
}

fn partition_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z-]*$").expect("valid regex"))
}

fn role_arn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^arn:[a-z][a-z-]*:iam::\d{12}:role/[A-Za-z0-9_+=,.@/-]+$").expect("valid regex")
    })
}

fn policy_arn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^arn:[a-z][a-z-]*:iam::(aws|\d{12}):policy/[A-Za-z0-9_+=,.@/-]+$")
            .expect("valid regex")
    })
}

pub fn is_account_id(value: &str) -> bool {
    account_id_regex().is_match(value)
}

pub fn is_partition(value: &str) -> bool {
    partition_regex().is_match(value)
}

pub fn is_role_arn(value: &str) -> bool {
    role_arn_regex().is_match(value)
}

pub fn is_policy_arn(value: &str) -> bool {
    policy_arn_regex().is_match(value)
}

pub fn user_arn(partition: &str, account_id: &str, user_name: &str) -> String {
    format!("arn:{partition}:iam::{account_id}:user/{user_name}")
}

pub fn mfa_arn(partition: &str, account_id: &str, user_name: &str) -> String {
    format!("arn:{partition}:iam::{account_id}:mfa/{user_name}")
}

/// ARN of a policy managed by AWS, e.g. `IAMReadOnlyAccess`.
pub fn aws_managed_policy_arn(partition: &str, policy_name: &str) -> String {
    format!("arn:{partition}:iam::aws:policy/{policy_name}")
}

/// Extract the 12-digit account id (field 5 of the colon-delimited format).
pub fn account_from_arn(arn: &str) -> Option<&str> {
    let parts: Vec<&str> = arn.split(':').collect();
    if parts.len() >= 6 && parts[0] == "arn" && is_account_id(parts[4]) {
        return Some(parts[4]);
    }
    None
}

/// Extract the partition (field 2 of the colon-delimited format).
pub fn partition_from_arn(arn: &str) -> Option<&str> {
    let parts: Vec<&str> = arn.split(':').collect();
    if parts.len() >= 6 && parts[0] == "arn" && is_partition(parts[1]) {
        return Some(parts[1]);
    }
    None
}

/// Text that tells `policy_arn` apart from every other policy ARN, used to
/// derive attachment labels.
///
/// This is the policy path, prefixed with the owning account unless AWS
/// manages the policy, and with the partition when it is not `aws`:
/// `ReadOnlyAccess`, `123456789012:ReadOnlyAccess`, `aws-cn:ReadOnlyAccess`.
pub fn policy_label_key(policy_arn: &str) -> String {
    let parts: Vec<&str> = policy_arn.splitn(6, ':').collect();
    let ["arn", partition, _, _, account, resource] = parts.as_slice() else {
        return policy_arn.to_string();
    };
    let path = resource.strip_prefix("policy/").unwrap_or(*resource);
    let mut key = String::new();
    if *partition != DEFAULT_PARTITION {
        key.push_str(partition);
        key.push(':');
    }
    if *account != "aws" {
        key.push_str(account);
        key.push(':');
    }
    key.push_str(path);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_and_mfa_arns() {
        assert_eq!(
            user_arn("aws", "123456789012", "test@example.com"),
            "arn:aws:iam::123456789012:user/test@example.com"
        );
        assert_eq!(
            mfa_arn("aws-cn", "123456789012", "test@example.com"),
            "arn:aws-cn:iam::123456789012:mfa/test@example.com"
        );
        assert_eq!(
            aws_managed_policy_arn("aws", "IAMUserSSHKeys"),
            "arn:aws:iam::aws:policy/IAMUserSSHKeys"
        );
    }

    #[test]
    fn test_account_from_arn_valid() {
        assert_eq!(
            account_from_arn("arn:aws:sts::123456789012:assumed-role/Admin/session"),
            Some("123456789012")
        );
        assert_eq!(
            account_from_arn("arn:aws:iam::987654321098:user/john"),
            Some("987654321098")
        );
    }

    #[test]
    fn test_account_from_arn_invalid() {
        assert_eq!(account_from_arn("not-an-arn"), None);
        assert_eq!(account_from_arn("arn:aws:iam"), None);
        assert_eq!(account_from_arn("arn:aws:iam::::"), None);
        assert_eq!(account_from_arn("arn:aws:iam::12345678901a:role/MyRole"), None);
        assert_eq!(account_from_arn("arn:aws:iam::1234567890123:role/MyRole"), None);
    }

    #[test]
    fn test_partition_from_arn() {
        assert_eq!(
            partition_from_arn("arn:aws-us-gov:iam::123456789012:user/john"),
            Some("aws-us-gov")
        );
        assert_eq!(partition_from_arn("arn::iam::123456789012:user/john"), None);
    }

    #[test]
    fn test_role_arn_validation() {
        assert!(is_role_arn("arn:aws:iam::123456789012:role/admin"));
        assert!(is_role_arn("arn:aws:iam::123456789012:role/path/to/read-only"));
        assert!(!is_role_arn("arn:aws:iam::123456789012:user/admin"));
        assert!(!is_role_arn("arn:aws:iam::aws:role/admin"));
        assert!(!is_role_arn("admin"));
    }

    #[test]
    fn test_policy_arn_validation() {
        assert!(is_policy_arn("arn:aws:iam::aws:policy/ReadOnlyAccess"));
        assert!(is_policy_arn("arn:aws:iam::aws:policy/job-function/Billing"));
        assert!(is_policy_arn("arn:aws:iam::123456789012:policy/custom"));
        assert!(!is_policy_arn("arn:aws:iam::123456789012:role/custom"));
        assert!(!is_policy_arn("ReadOnlyAccess"));
    }

    #[test]
    fn test_policy_label_key() {
        assert_eq!(
            policy_label_key("arn:aws:iam::aws:policy/job-function/Billing"),
            "job-function/Billing"
        );
        assert_eq!(
            policy_label_key("arn:aws:iam::123456789012:policy/ReadOnlyAccess"),
            "123456789012:ReadOnlyAccess"
        );
        assert_eq!(
            policy_label_key("arn:aws-cn:iam::aws:policy/ReadOnlyAccess"),
            "aws-cn:ReadOnlyAccess"
        );
        assert_eq!(policy_label_key("weird"), "weird");
    }

    #[test]
    fn test_non_ascii_arn_paths_rejected() {
        assert!(!is_policy_arn("arn:aws:iam::123456789012:policy/名前"));
        assert!(!is_role_arn("arn:aws:iam::123456789012:role/名前"));
    }
}
