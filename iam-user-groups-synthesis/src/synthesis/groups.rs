//! Per-group rules

use log::debug;

use super::policy_builder::assumable_roles;
use crate::arn::policy_label_key;
use crate::inventory::GroupSpec;
use crate::resources::{
    label_for, owned_label, Address, GroupMembership, GroupOutput, GroupPolicyAttachment, ManagedGroup,
    ManagedPolicy, PlannedResource, PolicyTarget, Resource, GROUP_TYPE, POLICY_TYPE,
};

pub(crate) struct GroupResources {
    pub resources: Vec<PlannedResource>,
    pub output: GroupOutput,
}

pub fn membership_name(group_name: &str) -> String {
    format!("{group_name}-membership")
}

pub fn assumable_roles_policy_name(group_name: &str) -> String {
    format!("{group_name}-assumable-roles-policy")
}

pub(crate) fn synthesize_group(group: &GroupSpec) -> GroupResources {
    let label = label_for(&group.name);
    let mut resources = vec![PlannedResource::new(
        label.clone(),
        Resource::Group(ManagedGroup {
            name: group.name.clone(),
        }),
    )];

    let users = group.distinct_users();
    if !users.is_empty() {
        resources.push(PlannedResource::new(
            label.clone(),
            Resource::GroupMembership(GroupMembership {
                name: membership_name(&group.name),
                group: group.name.clone(),
                users,
            }),
        ));
    }

    for policy_arn in group.distinct_policies() {
        resources.push(PlannedResource::new(
            owned_label(&label, "policy", &policy_label_key(&policy_arn)),
            Resource::GroupPolicyAttachment(GroupPolicyAttachment {
                group: group.name.clone(),
                policy_arn: PolicyTarget::Arn(policy_arn),
            }),
        ));
    }

    let roles = group.distinct_assumable_roles();
    if !roles.is_empty() {
        let policy_label = owned_label(&label, "assumable", "roles");
        resources.push(PlannedResource::new(
            policy_label.clone(),
            Resource::Policy(ManagedPolicy {
                name: assumable_roles_policy_name(&group.name),
                policy: assumable_roles(roles),
            }),
        ));
        resources.push(PlannedResource::new(
            policy_label.clone(),
            Resource::GroupPolicyAttachment(GroupPolicyAttachment {
                group: group.name.clone(),
                policy_arn: PolicyTarget::Owned(
                    Address::new(POLICY_TYPE, policy_label).attribute("arn"),
                ),
            }),
        ));
    }

    debug!(
        "Synthesized {} resources for group '{}'",
        resources.len(),
        group.name
    );
    GroupResources {
        resources,
        output: GroupOutput {
            name: group.name.clone(),
            arn: Address::new(GROUP_TYPE, label).attribute("arn"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_group() {
        let out = synthesize_group(&GroupSpec::new("g1"));
        assert_eq!(out.resources.len(), 1);
        assert_eq!(out.resources[0].address.to_string(), "aws_iam_group.g1");
        assert_eq!(out.output.arn.interpolation(), "${aws_iam_group.g1.arn}");
    }

    #[test]
    fn test_membership_and_attachments() {
        let group = GroupSpec::new("test-group")
            .with_users(["test-user1@example.com", "test-user2@example.com"])
            .with_policies([
                "arn:aws:iam::aws:policy/ReadOnlyAccess",
                "arn:aws:iam::aws:policy/job-function/Billing",
            ]);
        let out = synthesize_group(&group);

        let addresses: Vec<String> = out.resources.iter().map(|r| r.address.to_string()).collect();
        assert_eq!(
            addresses,
            vec![
                "aws_iam_group.test-group",
                "aws_iam_group_membership.test-group",
                "aws_iam_group_policy_attachment.test-group_policy_ReadOnlyAccess",
                "aws_iam_group_policy_attachment.test-group_policy_job-function_slash_Billing",
            ]
        );
        match &out.resources[1].resource {
            Resource::GroupMembership(m) => {
                assert_eq!(m.name, "test-group-membership");
                assert_eq!(m.group, "test-group");
                assert_eq!(m.users, vec!["test-user1@example.com", "test-user2@example.com"]);
            }
            other => panic!("expected membership, got {other:?}"),
        }
    }

    #[test]
    fn test_assumable_roles_policy_and_attachment() {
        let group = GroupSpec::new("g1")
            .with_users(["a", "b"])
            .with_assumable_roles(["arn:aws:iam::123456789012:role/r1"]);
        let out = synthesize_group(&group);

        assert_eq!(out.resources.len(), 4);
        match &out.resources[2].resource {
            Resource::Policy(p) => {
                assert_eq!(p.name, "g1-assumable-roles-policy");
                assert_eq!(p.policy.statement.len(), 1);
                assert_eq!(
                    p.policy.statement[0].resources(),
                    vec!["arn:aws:iam::123456789012:role/r1"]
                );
            }
            other => panic!("expected policy, got {other:?}"),
        }
        match &out.resources[3].resource {
            Resource::GroupPolicyAttachment(a) => {
                assert_eq!(a.group, "g1");
                assert_eq!(
                    a.policy_arn,
                    PolicyTarget::Owned(Address::new(POLICY_TYPE, "g1_assumable_roles").attribute("arn"))
                );
            }
            other => panic!("expected attachment, got {other:?}"),
        }
    }

    #[test]
    fn test_same_policy_name_in_two_accounts() {
        let group = GroupSpec::new("g").with_policies([
            "arn:aws:iam::aws:policy/ReadOnlyAccess",
            "arn:aws:iam::123456789012:policy/ReadOnlyAccess",
        ]);
        let out = synthesize_group(&group);

        let labels: Vec<&str> = out.resources[1..].iter().map(|r| r.address.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["g_policy_ReadOnlyAccess", "g_policy_123456789012_colon_ReadOnlyAccess"]
        );
    }

    #[test]
    fn test_policy_named_like_assumable_roles_keeps_its_attachment() {
        let group = GroupSpec::new("g")
            .with_policies(["arn:aws:iam::123456789012:policy/assumable_roles"])
            .with_assumable_roles(["arn:aws:iam::123456789012:role/r1"]);
        let out = synthesize_group(&group);

        let addresses: Vec<String> = out.resources.iter().map(|r| r.address.to_string()).collect();
        assert_eq!(
            addresses,
            vec![
                "aws_iam_group.g",
                "aws_iam_group_policy_attachment.g_policy_123456789012_colon_assumable__roles",
                "aws_iam_policy.g_assumable_roles",
                "aws_iam_group_policy_attachment.g_assumable_roles",
            ]
        );
    }
}
