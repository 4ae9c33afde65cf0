//! Policy document builders (deterministic statement and action order)

use crate::context::AwsContext;
use crate::types::{ActionBlock, PolicyDocument, ResourceBlock, Statement};

pub const CHANGE_OWN_PASSWORD_POLICY: &str = "IAMUserChangeOwnPassword";
pub const MANAGE_OWN_PROFILE_POLICY: &str = "IAMUserManageOwnProfile";
pub const MANAGE_OWN_MFA_POLICY: &str = "IAMUserManageOwnMFA";
pub const ENFORCE_MFA_POLICY: &str = "EnforceMFA";

/// AWS managed policies attached to every enabled user.
pub const USER_MANAGED_POLICIES: [&str; 3] = [
    "IAMReadOnlyAccess",
    "IAMSelfManageServiceSpecificCredentials",
    "IAMUserSSHKeys",
];

/// Account-wide read actions every user may call without MFA.
pub const ACCOUNT_WIDE_ACTIONS: [&str; 5] = [
    "iam:GetAccountPasswordPolicy",
    "iam:GetAccountSummary",
    "iam:ListUsers",
    "iam:ListAccountAliases",
    "iam:List*MFADevices",
];

/// Actions exempt from the MFA deny, so a user can sign in and register a device.
pub const MFA_EXEMPT_ACTIONS: [&str; 8] = [
    "iam:*LoginProfile",
    "iam:*MFADevice",
    "iam:ChangePassword",
    "iam:GetAccountPasswordPolicy",
    "iam:GetAccountSummary",
    "iam:List*MFADevices",
    "iam:ListAccountAliases",
    "iam:ListUsers",
];

/// Self-service credential actions that stay restricted to the user's own entities.
pub const SELF_CREDENTIAL_ACTIONS: [&str; 3] =
    ["iam:*LoginProfile", "iam:*MFADevice", "iam:ChangePassword"];

pub const MANAGE_OWN_PROFILE_ACTIONS: [&str; 3] = [
    "iam:*AccessKey*",
    "iam:*LoginProfile",
    "iam:*SigningCertificate*",
];

pub const MFA_CONDITION_OPERATOR: &str = "BoolIfExists";
pub const MFA_CONDITION_KEY: &str = "aws:MultiFactorAuthPresent";

/// Allow `iam:ChangePassword` on the user's own ARN, plus reading the
/// account password policy.
pub fn change_own_password(ctx: &AwsContext, user_name: &str) -> PolicyDocument {
    PolicyDocument::new(vec![
        Statement::allow("iam:ChangePassword", ctx.user_arn(user_name))
            .with_sid("AllowChangeOwnPassword"),
        Statement::allow(&ACCOUNT_WIDE_ACTIONS[..1], "*")
            .with_sid("AllowViewAccountPasswordPolicy"),
    ])
}

pub fn manage_own_profile(ctx: &AwsContext, user_name: &str) -> PolicyDocument {
    PolicyDocument::new(vec![Statement::allow(
        &MANAGE_OWN_PROFILE_ACTIONS[..],
        ctx.user_arn(user_name),
    )
    .with_sid("AllowManageOwnProfile")])
}

/// Allow MFA device management on the user's own device and user ARN, plus
/// the remaining account-wide read actions.
pub fn manage_own_mfa(ctx: &AwsContext, user_name: &str) -> PolicyDocument {
    PolicyDocument::new(vec![
        Statement::allow("iam:*MFADevice", own_entities(ctx, user_name))
            .with_sid("AllowManageOwnMFA"),
        Statement::allow(&ACCOUNT_WIDE_ACTIONS[1..], "*").with_sid("AllowViewAccountInformation"),
    ])
}

/// Two deny statements, in this order:
/// 1. everything except the exempt self-service actions, on any resource;
/// 2. the self-service credential actions on anything but the user's own entities.
///
/// Both only apply when the session was not established with MFA.
pub fn enforce_mfa(ctx: &AwsContext, user_name: &str) -> PolicyDocument {
    PolicyDocument::new(vec![
        Statement::deny(
            ActionBlock::NotAction((&MFA_EXEMPT_ACTIONS[..]).into()),
            ResourceBlock::Resource("*".into()),
        )
        .with_sid("DenyAllExceptSelfServiceWithoutMFA")
        .with_condition(MFA_CONDITION_OPERATOR, MFA_CONDITION_KEY, "false"),
        Statement::deny(
            ActionBlock::Action((&SELF_CREDENTIAL_ACTIONS[..]).into()),
            ResourceBlock::NotResource(own_entities(ctx, user_name).into()),
        )
        .with_sid("DenyOtherUsersCredentialsWithoutMFA")
        .with_condition(MFA_CONDITION_OPERATOR, MFA_CONDITION_KEY, "false"),
    ])
}

/// Single Allow `sts:AssumeRole` statement on exactly the given role ARNs.
pub fn assumable_roles(role_arns: Vec<String>) -> PolicyDocument {
    PolicyDocument::new(vec![
        Statement::allow("sts:AssumeRole", role_arns).with_sid("AllowAssumeRoles")
    ])
}

/// `[mfa/<name>, user/<name>]`
fn own_entities(ctx: &AwsContext, user_name: &str) -> Vec<String> {
    vec![ctx.mfa_arn(user_name), ctx.user_arn(user_name)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Effect, OneOrMany};
    use serde_json::json;

    fn ctx() -> AwsContext {
        AwsContext::new("aws", "123456789012").unwrap()
    }

    #[test]
    fn test_change_own_password_scoped_to_own_arn() {
        let doc = change_own_password(&ctx(), "test@example.com");
        let stmt = doc.statement_by_sid("AllowChangeOwnPassword").unwrap();
        assert_eq!(stmt.effect, Effect::Allow);
        assert_eq!(stmt.actions(), vec!["iam:ChangePassword"]);
        assert_eq!(
            stmt.resources(),
            vec!["arn:aws:iam::123456789012:user/test@example.com"]
        );

        let read = doc.statement_by_sid("AllowViewAccountPasswordPolicy").unwrap();
        assert_eq!(read.actions(), vec!["iam:GetAccountPasswordPolicy"]);
        assert_eq!(read.resources(), vec!["*"]);
    }

    #[test]
    fn test_manage_own_profile_actions() {
        let doc = manage_own_profile(&ctx(), "a");
        assert_eq!(doc.statement.len(), 1);
        assert_eq!(
            doc.statement[0].action,
            ActionBlock::Action(OneOrMany::Multiple(vec![
                "iam:*AccessKey*".into(),
                "iam:*LoginProfile".into(),
                "iam:*SigningCertificate*".into(),
            ]))
        );
        assert_eq!(
            doc.statement[0].resource,
            ResourceBlock::Resource(OneOrMany::Single(
                "arn:aws:iam::123456789012:user/a".into()
            ))
        );
    }

    #[test]
    fn test_manage_own_mfa_resources_in_order() {
        let doc = manage_own_mfa(&ctx(), "a");
        let stmt = doc.statement_by_sid("AllowManageOwnMFA").unwrap();
        assert_eq!(stmt.actions(), vec!["iam:*MFADevice"]);
        assert_eq!(
            stmt.resources(),
            vec![
                "arn:aws:iam::123456789012:mfa/a",
                "arn:aws:iam::123456789012:user/a"
            ]
        );

        let read = doc.statement_by_sid("AllowViewAccountInformation").unwrap();
        assert_eq!(
            read.actions(),
            vec![
                "iam:GetAccountSummary",
                "iam:ListUsers",
                "iam:ListAccountAliases",
                "iam:List*MFADevices"
            ]
        );
    }

    #[test]
    fn test_enforce_mfa_document() {
        let doc = enforce_mfa(&ctx(), "test@example.com");
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({
                "Version": "2012-10-17",
                "Statement": [
                    {
                        "Sid": "DenyAllExceptSelfServiceWithoutMFA",
                        "Effect": "Deny",
                        "NotAction": [
                            "iam:*LoginProfile",
                            "iam:*MFADevice",
                            "iam:ChangePassword",
                            "iam:GetAccountPasswordPolicy",
                            "iam:GetAccountSummary",
                            "iam:List*MFADevices",
                            "iam:ListAccountAliases",
                            "iam:ListUsers"
                        ],
                        "Resource": "*",
                        "Condition": {"BoolIfExists": {"aws:MultiFactorAuthPresent": "false"}}
                    },
                    {
                        "Sid": "DenyOtherUsersCredentialsWithoutMFA",
                        "Effect": "Deny",
                        "Action": ["iam:*LoginProfile", "iam:*MFADevice", "iam:ChangePassword"],
                        "NotResource": [
                            "arn:aws:iam::123456789012:mfa/test@example.com",
                            "arn:aws:iam::123456789012:user/test@example.com"
                        ],
                        "Condition": {"BoolIfExists": {"aws:MultiFactorAuthPresent": "false"}}
                    }
                ]
            })
        );
    }

    #[test]
    fn test_assumable_roles_keeps_input_list() {
        let roles = vec![
            "arn:aws:iam::123456789012:role/r2".to_string(),
            "arn:aws:iam::123456789012:role/r1".to_string(),
        ];
        let doc = assumable_roles(roles.clone());
        assert_eq!(doc.statement.len(), 1);
        assert_eq!(doc.statement[0].effect, Effect::Allow);
        assert_eq!(doc.statement[0].actions(), vec!["sts:AssumeRole"]);
        assert_eq!(doc.statement[0].resources(), roles);
    }
}
