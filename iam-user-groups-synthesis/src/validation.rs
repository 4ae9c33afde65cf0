//! Inventory validation, run before any resource is synthesized

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use log::warn;
use regex::Regex;

use crate::arn::{is_policy_arn, is_role_arn};
use crate::context::{MembershipCheck, SynthesisOptions};
use crate::error::{SynthesisError, SynthesisResult};
use crate::inventory::Inventory;

pub const MAX_USER_NAME_LEN: usize = 64;
pub const MAX_GROUP_NAME_LEN: usize = 128;
pub const MAX_PASSWORD_LENGTH: u32 = 128;

fn iam_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_+=,.@-]+$").expect("valid regex"))
}

/// Non-fatal findings of a successful validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

/// Check the inventory against the synthesis rules.
///
/// Fails on the first malformed or duplicate spec. Group members that are
/// not enabled users of the inventory are reported as warnings, or fail
/// under [`MembershipCheck::Strict`].
pub fn validate(inventory: &Inventory, options: &SynthesisOptions) -> SynthesisResult<ValidationReport> {
    validate_users(inventory)?;
    validate_groups(inventory)?;
    validate_credentials(inventory, options)?;
    check_membership(inventory, options.membership_check)
}

fn validate_users(inventory: &Inventory) -> SynthesisResult<()> {
    let mut seen = HashSet::new();
    for (i, user) in inventory.users.iter().enumerate() {
        let field = format!("users[{i}]");
        check_name(&user.name, MAX_USER_NAME_LEN, &format!("{field}.name"), "user")?;
        if !seen.insert(user.name.as_str()) {
            return Err(SynthesisError::configuration_at(
                format!("{field}.name"),
                format!("duplicate user name '{}'", user.name),
            ));
        }
        if !(1..=MAX_PASSWORD_LENGTH).contains(&user.password_length) {
            return Err(SynthesisError::configuration_at(
                format!("{field}.password_length"),
                format!(
                    "password length for user '{}' must be between 1 and {MAX_PASSWORD_LENGTH}, got {}",
                    user.name, user.password_length
                ),
            ));
        }
    }
    Ok(())
}

fn validate_groups(inventory: &Inventory) -> SynthesisResult<()> {
    let mut seen = HashSet::new();
    for (i, group) in inventory.groups.iter().enumerate() {
        let field = format!("groups[{i}]");
        check_name(&group.name, MAX_GROUP_NAME_LEN, &format!("{field}.name"), "group")?;
        if !seen.insert(group.name.as_str()) {
            return Err(SynthesisError::configuration_at(
                format!("{field}.name"),
                format!("duplicate group name '{}'", group.name),
            ));
        }
        for (j, member) in group.users.iter().enumerate() {
            check_name(member, MAX_USER_NAME_LEN, &format!("{field}.users[{j}]"), "member")?;
        }
        for (j, policy_arn) in group.policies.iter().enumerate() {
            if !is_policy_arn(policy_arn) {
                return Err(SynthesisError::configuration_at(
                    format!("{field}.policies[{j}]"),
                    format!("'{policy_arn}' is not an IAM policy ARN"),
                ));
            }
        }
        for (j, role_arn) in group.assumable_roles.iter().enumerate() {
            if !is_role_arn(role_arn) {
                return Err(SynthesisError::configuration_at(
                    format!("{field}.assumable_roles[{j}]"),
                    format!("'{role_arn}' is not an IAM role ARN"),
                ));
            }
        }
    }
    Ok(())
}

fn validate_credentials(inventory: &Inventory, options: &SynthesisOptions) -> SynthesisResult<()> {
    if options.pgp_key.is_some() {
        return Ok(());
    }
    match inventory.users.iter().position(|u| u.requires_credentials()) {
        Some(i) => Err(SynthesisError::configuration_at(
            format!("users[{i}]"),
            format!(
                "user '{}' requests a login profile or access key but no PGP public key was provided",
                inventory.users[i].name
            ),
        )),
        None => Ok(()),
    }
}

fn check_membership(inventory: &Inventory, check: MembershipCheck) -> SynthesisResult<ValidationReport> {
    let users: HashMap<&str, bool> = inventory
        .users
        .iter()
        .map(|u| (u.name.as_str(), u.enabled))
        .collect();

    let mut report = ValidationReport::default();
    for (i, group) in inventory.groups.iter().enumerate() {
        for (j, member) in group.users.iter().enumerate() {
            let problem = match users.get(member.as_str()) {
                None => "is not declared in the user inventory",
                Some(false) => "is disabled",
                Some(true) => continue,
            };
            let message = format!("member '{member}' of group '{}' {problem}", group.name);
            if check == MembershipCheck::Strict {
                return Err(SynthesisError::configuration_at(
                    format!("groups[{i}].users[{j}]"),
                    message,
                ));
            }
            warn!("{}", message);
            report.warnings.push(message);
        }
    }
    Ok(report)
}

fn check_name(name: &str, max_len: usize, field: &str, kind: &str) -> SynthesisResult<()> {
    if name.is_empty() || name.len() > max_len || !iam_name_regex().is_match(name) {
        return Err(SynthesisError::configuration_at(
            field,
            format!(
                "invalid {kind} name '{name}': expected 1 to {max_len} characters from [A-Za-z0-9_+=,.@-]"
            ),
        ));
    }
    Ok(())
}
