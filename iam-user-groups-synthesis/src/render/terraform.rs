//! Terraform JSON configuration syntax
//!
//! ```json
//! {
//!   "resource": { "<type>": { "<label>": { ...attributes } } },
//!   "output": {
//!     "users":  { "value": [...], "sensitive": true },
//!     "groups": { "value": [...] }
//!   }
//! }
//! ```
//!
//! Attributes naming a user or group that the plan itself creates are
//! rendered as `${<type>.<label>.name}` so Terraform creates the referenced
//! resource first. Policy documents are embedded as JSON strings.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::{SynthesisError, SynthesisResult};
use crate::resources::{Address, PlannedResource, PolicyTarget, Resource, ResourcePlan};
use crate::types::PolicyDocument;

/// Render `plan` as a Terraform JSON configuration.
pub fn render(plan: &ResourcePlan) -> SynthesisResult<Value> {
    let refs = NameRefs::new(plan);

    let mut resource: Map<String, Value> = Map::new();
    for planned in &plan.resources {
        let attributes = render_attributes(&planned.resource, &refs)?;
        let by_label = resource
            .entry(planned.address.resource_type)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(by_label) = by_label {
            by_label.insert(planned.address.label.clone(), attributes);
        }
    }

    let mut root = Map::new();
    if !resource.is_empty() {
        root.insert("resource".to_string(), Value::Object(resource));
    }
    root.insert(
        "output".to_string(),
        json!({
            "users": {
                "value": to_value(&plan.outputs.users)?,
                "sensitive": true
            },
            "groups": {
                "value": to_value(&plan.outputs.groups)?
            }
        }),
    );
    Ok(Value::Object(root))
}

/// Render `plan` as pretty-printed Terraform JSON.
pub fn render_string(plan: &ResourcePlan) -> SynthesisResult<String> {
    serde_json::to_string_pretty(&render(plan)?).map_err(SynthesisError::render)
}

/// Addresses of the users and groups created by the plan, by IAM name.
struct NameRefs<'a> {
    users: HashMap<&'a str, &'a Address>,
    groups: HashMap<&'a str, &'a Address>,
}

impl<'a> NameRefs<'a> {
    fn new(plan: &'a ResourcePlan) -> Self {
        let mut users = HashMap::new();
        let mut groups = HashMap::new();
        for PlannedResource { address, resource } in &plan.resources {
            match resource {
                Resource::User(u) => {
                    users.insert(u.name.as_str(), address);
                }
                Resource::Group(g) => {
                    groups.insert(g.name.as_str(), address);
                }
                _ => {}
            }
        }
        Self { users, groups }
    }

    fn user(&self, name: &str) -> Value {
        name_ref(self.users.get(name).copied(), name)
    }

    fn group(&self, name: &str) -> Value {
        name_ref(self.groups.get(name).copied(), name)
    }
}

fn name_ref(address: Option<&Address>, name: &str) -> Value {
    match address {
        Some(address) => Value::String(address.attribute("name").interpolation()),
        None => Value::String(name.to_string()),
    }
}

fn render_attributes(resource: &Resource, refs: &NameRefs<'_>) -> SynthesisResult<Value> {
    let value = match resource {
        Resource::User(u) => json!({
            "name": u.name,
            "force_destroy": u.force_destroy,
        }),
        Resource::LoginProfile(p) => json!({
            "user": refs.user(&p.user),
            "password_length": p.password_length,
            "pgp_key": p.pgp_key,
        }),
        Resource::AccessKey(k) => json!({
            "user": refs.user(&k.user),
            "pgp_key": k.pgp_key,
        }),
        Resource::UserPolicyAttachment(a) => json!({
            "user": refs.user(&a.user),
            "policy_arn": a.policy_arn,
        }),
        Resource::UserPolicy(p) => json!({
            "name": p.name,
            "user": refs.user(&p.user),
            "policy": policy_string(&p.policy)?,
        }),
        Resource::Group(g) => json!({ "name": g.name }),
        Resource::GroupMembership(m) => json!({
            "name": m.name,
            "group": refs.group(&m.group),
            "users": m.users.iter().map(|u| refs.user(u)).collect::<Vec<_>>(),
        }),
        Resource::GroupPolicyAttachment(a) => {
            let policy_arn = match &a.policy_arn {
                PolicyTarget::Arn(arn) => arn.clone(),
                PolicyTarget::Owned(attr) => attr.interpolation(),
            };
            json!({
                "group": refs.group(&a.group),
                "policy_arn": policy_arn,
            })
        }
        Resource::Policy(p) => json!({
            "name": p.name,
            "policy": policy_string(&p.policy)?,
        }),
    };
    Ok(value)
}

fn policy_string(policy: &PolicyDocument) -> SynthesisResult<String> {
    policy.to_json().map_err(SynthesisError::render)
}

fn to_value<T: Serialize>(value: &T) -> SynthesisResult<Value> {
    serde_json::to_value(value).map_err(SynthesisError::render)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AwsContext, PgpKey, SynthesisOptions};
    use crate::inventory::{GroupSpec, Inventory, UserSpec};
    use crate::synthesis::synthesize;

    fn plan(inventory: &Inventory) -> ResourcePlan {
        let ctx = AwsContext::new("aws", "123456789012").unwrap();
        let options = SynthesisOptions::default().with_pgp_key(PgpKey::from_bytes(b"key").unwrap());
        synthesize(&ctx, &options, inventory).unwrap()
    }

    #[test]
    fn test_empty_plan_has_outputs_only() {
        let value = render(&ResourcePlan::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "output": {
                    "users": {"value": [], "sensitive": true},
                    "groups": {"value": []}
                }
            })
        );
    }

    #[test]
    fn test_user_resources_reference_the_user() {
        let value = render(&plan(&Inventory::new(
            vec![UserSpec::new("a@x.com").with_login_profile(true)],
            vec![],
        )))
        .unwrap();

        let resource = &value["resource"];
        assert_eq!(
            resource["aws_iam_user"]["a_at_x_dot_com"],
            json!({"name": "a@x.com", "force_destroy": true})
        );
        assert_eq!(
            resource["aws_iam_user_login_profile"]["a_at_x_dot_com"]["user"],
            "${aws_iam_user.a_at_x_dot_com.name}"
        );
        assert_eq!(
            resource["aws_iam_user_policy_attachment"]["a_at_x_dot_com_IAMUserSSHKeys"]["policy_arn"],
            "arn:aws:iam::aws:policy/IAMUserSSHKeys"
        );

        let policy = resource["aws_iam_user_policy"]["a_at_x_dot_com_IAMUserChangeOwnPassword"]["policy"]
            .as_str()
            .unwrap();
        let doc: PolicyDocument = serde_json::from_str(policy).unwrap();
        assert_eq!(doc.statement[0].actions(), vec!["iam:ChangePassword"]);

        assert_eq!(
            value["output"]["users"]["value"][0],
            json!({
                "name": "a@x.com",
                "arn": "${aws_iam_user.a_at_x_dot_com.arn}",
                "password": "${aws_iam_user_login_profile.a_at_x_dot_com.encrypted_password}"
            })
        );
    }

    #[test]
    fn test_group_resources() {
        let value = render(&plan(&Inventory::new(
            vec![UserSpec::new("a")],
            vec![GroupSpec::new("g1")
                .with_users(["a", "outsider"])
                .with_assumable_roles(["arn:aws:iam::123456789012:role/r1"])],
        )))
        .unwrap();

        let resource = &value["resource"];
        assert_eq!(
            resource["aws_iam_group_membership"]["g1"],
            json!({
                "name": "g1-membership",
                "group": "${aws_iam_group.g1.name}",
                "users": ["${aws_iam_user.a.name}", "outsider"]
            })
        );
        assert_eq!(
            resource["aws_iam_group_policy_attachment"]["g1_assumable_roles"]["policy_arn"],
            "${aws_iam_policy.g1_assumable_roles.arn}"
        );
        assert_eq!(
            resource["aws_iam_policy"]["g1_assumable_roles"]["name"],
            "g1-assumable-roles-policy"
        );
        assert!(value["output"]["groups"].get("sensitive").is_none());
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let inventory = Inventory::new(
            vec![UserSpec::new("b").with_enforce_mfa(true), UserSpec::new("a")],
            vec![GroupSpec::new("g").with_users(["b", "a"])],
        );
        let first = render_string(&plan(&inventory)).unwrap();
        let second = render_string(&plan(&inventory)).unwrap();
        assert_eq!(first, second);
        assert!(first.find("aws_iam_user.b").unwrap() < first.find("aws_iam_user.a").unwrap());
    }
}
