//! Per-user rules

use log::debug;

use super::policy_builder::{
    change_own_password, enforce_mfa, manage_own_mfa, manage_own_profile,
    CHANGE_OWN_PASSWORD_POLICY, ENFORCE_MFA_POLICY, MANAGE_OWN_MFA_POLICY,
    MANAGE_OWN_PROFILE_POLICY, USER_MANAGED_POLICIES,
};
use crate::arn::aws_managed_policy_arn;
use crate::context::{AwsContext, PgpKey};
use crate::error::{SynthesisError, SynthesisResult};
use crate::inventory::UserSpec;
use crate::resources::{
    label_for, AccessKey, Address, LoginProfile, ManagedUser, PlannedResource, Resource,
    UserOutput, UserPolicy, UserPolicyAttachment, ACCESS_KEY_TYPE, LOGIN_PROFILE_TYPE, USER_TYPE,
};
use crate::types::PolicyDocument;

/// Resources and output entry of one enabled user.
pub(crate) struct UserResources {
    pub resources: Vec<PlannedResource>,
    pub output: UserOutput,
}

/// Apply the per-user rules. Disabled users yield `None`.
pub(crate) fn synthesize_user(
    ctx: &AwsContext,
    pgp_key: Option<&PgpKey>,
    user: &UserSpec,
) -> SynthesisResult<Option<UserResources>> {
    if !user.enabled {
        debug!("Skipping disabled user '{}'", user.name);
        return Ok(None);
    }

    let label = label_for(&user.name);
    let mut resources = vec![PlannedResource::new(
        label.clone(),
        Resource::User(ManagedUser {
            name: user.name.clone(),
            force_destroy: true,
        }),
    )];

    let user_address = Address::new(USER_TYPE, label.clone());
    let mut output = UserOutput {
        name: user.name.clone(),
        arn: user_address.attribute("arn"),
        password: None,
        access_key_id: None,
        secret_access_key: None,
    };

    if user.include_login_profile {
        resources.push(PlannedResource::new(
            label.clone(),
            Resource::LoginProfile(LoginProfile {
                user: user.name.clone(),
                password_length: user.password_length,
                pgp_key: require_key(pgp_key, user)?.as_base64().to_string(),
            }),
        ));
        output.password =
            Some(Address::new(LOGIN_PROFILE_TYPE, label.clone()).attribute("encrypted_password"));
    }

    if user.include_access_key {
        resources.push(PlannedResource::new(
            label.clone(),
            Resource::AccessKey(AccessKey {
                user: user.name.clone(),
                pgp_key: require_key(pgp_key, user)?.as_base64().to_string(),
            }),
        ));
        let key_address = Address::new(ACCESS_KEY_TYPE, label.clone());
        output.access_key_id = Some(key_address.attribute("id"));
        output.secret_access_key = Some(key_address.attribute("encrypted_secret"));
    }

    for policy_name in USER_MANAGED_POLICIES {
        resources.push(PlannedResource::new(
            format!("{label}_{policy_name}"),
            Resource::UserPolicyAttachment(UserPolicyAttachment {
                user: user.name.clone(),
                policy_arn: aws_managed_policy_arn(ctx.partition(), policy_name),
            }),
        ));
    }

    let mut inline: Vec<(&str, PolicyDocument)> = vec![
        (CHANGE_OWN_PASSWORD_POLICY, change_own_password(ctx, &user.name)),
        (MANAGE_OWN_PROFILE_POLICY, manage_own_profile(ctx, &user.name)),
        (MANAGE_OWN_MFA_POLICY, manage_own_mfa(ctx, &user.name)),
    ];
    if user.enforce_mfa {
        inline.push((ENFORCE_MFA_POLICY, enforce_mfa(ctx, &user.name)));
    }
    for (policy_name, policy) in inline {
        resources.push(PlannedResource::new(
            format!("{label}_{policy_name}"),
            Resource::UserPolicy(UserPolicy {
                name: policy_name.to_string(),
                user: user.name.clone(),
                policy,
            }),
        ));
    }

    debug!(
        "Synthesized {} resources for user '{}'",
        resources.len(),
        user.name
    );
    Ok(Some(UserResources { resources, output }))
}

/// `validate` rejects this case before synthesis starts.
fn require_key<'a>(pgp_key: Option<&'a PgpKey>, user: &UserSpec) -> SynthesisResult<&'a PgpKey> {
    pgp_key.ok_or_else(|| {
        SynthesisError::configuration(format!(
            "user '{}' requests credentials but no PGP public key was provided",
            user.name
        ))
    })
}
