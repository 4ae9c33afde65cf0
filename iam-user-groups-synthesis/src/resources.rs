//! Resource plan produced by the synthesizer
//!
//! Each [`Resource`] is a description for the external provisioning engine;
//! nothing here talks to AWS. Resources carry a Terraform style address
//! (`<type>.<label>`) that must be unique within a plan.

use serde::Serialize;
use std::fmt;

use crate::types::PolicyDocument;

pub const USER_TYPE: &str = "aws_iam_user";
pub const LOGIN_PROFILE_TYPE: &str = "aws_iam_user_login_profile";
pub const ACCESS_KEY_TYPE: &str = "aws_iam_access_key";
pub const USER_POLICY_ATTACHMENT_TYPE: &str = "aws_iam_user_policy_attachment";
pub const USER_POLICY_TYPE: &str = "aws_iam_user_policy";
pub const GROUP_TYPE: &str = "aws_iam_group";
pub const GROUP_MEMBERSHIP_TYPE: &str = "aws_iam_group_membership";
pub const GROUP_POLICY_ATTACHMENT_TYPE: &str = "aws_iam_group_policy_attachment";
pub const POLICY_TYPE: &str = "aws_iam_policy";

/// Turn an arbitrary IAM name into a Terraform label.
///
/// Letters, digits and `-` are kept. Every other character becomes an
/// escape token (`_` is `__`, `@` is `_at_`, `.` is `_dot_`, anything else
/// without a name is `_u<hex>_`), so distinct names never share a label.
/// A leading digit or `-` is escaped as `_u<hex>_` as well, since labels
/// must start with a letter or `_`.
pub fn label_for(name: &str) -> String {
    let mut label = String::with_capacity(name.len());
    for (i, c) in name.chars().enumerate() {
        if i == 0 && (c.is_ascii_digit() || c == '-') {
            push_hex(&mut label, c);
        } else {
            push_escaped(&mut label, c);
        }
    }
    label
}

/// Label of a resource owned by the entity labelled `owner`, e.g. one
/// policy attachment of a group.
///
/// `kind` is a lowercase word without `_` that is not an escape token name,
/// which keeps `<owner>_<kind>_<part>` apart from every other label.
pub fn owned_label(owner: &str, kind: &str, part: &str) -> String {
    let mut label = format!("{owner}_{kind}_");
    for c in part.chars() {
        push_escaped(&mut label, c);
    }
    label
}

fn push_escaped(label: &mut String, c: char) {
    match c {
        c if c.is_ascii_alphanumeric() || c == '-' => label.push(c),
        '_' => label.push_str("__"),
        c => match escape_name(c) {
            Some(name) => {
                label.push('_');
                label.push_str(name);
                label.push('_');
            }
            None => push_hex(label, c),
        },
    }
}

const fn escape_name(c: char) -> Option<&'static str> {
    match c {
        '@' => Some("at"),
        '.' => Some("dot"),
        '+' => Some("plus"),
        '=' => Some("eq"),
        ',' => Some("comma"),
        '/' => Some("slash"),
        ':' => Some("colon"),
        _ => None,
    }
}

fn push_hex(label: &mut String, c: char) {
    label.push_str(&format!("_u{:x}_", u32::from(c)));
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Address {
    pub resource_type: &'static str,
    pub label: String,
}

impl Address {
    pub fn new(resource_type: &'static str, label: impl Into<String>) -> Self {
        Self {
            resource_type,
            label: label.into(),
        }
    }

    /// Reference to one attribute of this resource, e.g. its `arn`.
    pub fn attribute(&self, attribute: &'static str) -> AttributeRef {
        AttributeRef {
            address: self.clone(),
            attribute,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.label)
    }
}

/// A value only known once the provisioning engine has created the resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRef {
    pub address: Address,
    pub attribute: &'static str,
}

impl AttributeRef {
    /// Terraform interpolation syntax, `${aws_iam_user.label.arn}`.
    pub fn interpolation(&self) -> String {
        format!("${{{}.{}}}", self.address, self.attribute)
    }
}

impl Serialize for AttributeRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.interpolation())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedUser {
    pub name: String,
    pub force_destroy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginProfile {
    pub user: String,
    pub password_length: u32,
    pub pgp_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessKey {
    pub user: String,
    pub pgp_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPolicyAttachment {
    pub user: String,
    pub policy_arn: String,
}

/// Inline policy embedded on a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPolicy {
    pub name: String,
    pub user: String,
    pub policy: PolicyDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedGroup {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupMembership {
    pub name: String,
    pub group: String,
    pub users: Vec<String>,
}

/// Attachment of a policy to a group, by ARN or to a policy owned by the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupPolicyAttachment {
    pub group: String,
    pub policy_arn: PolicyTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PolicyTarget {
    Arn(String),
    Owned(AttributeRef),
}

/// Customer managed policy owned by the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedPolicy {
    pub name: String,
    pub policy: PolicyDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "attributes")]
pub enum Resource {
    #[serde(rename = "aws_iam_user")]
    User(ManagedUser),
    #[serde(rename = "aws_iam_user_login_profile")]
    LoginProfile(LoginProfile),
    #[serde(rename = "aws_iam_access_key")]
    AccessKey(AccessKey),
    #[serde(rename = "aws_iam_user_policy_attachment")]
    UserPolicyAttachment(UserPolicyAttachment),
    #[serde(rename = "aws_iam_user_policy")]
    UserPolicy(UserPolicy),
    #[serde(rename = "aws_iam_group")]
    Group(ManagedGroup),
    #[serde(rename = "aws_iam_group_membership")]
    GroupMembership(GroupMembership),
    #[serde(rename = "aws_iam_group_policy_attachment")]
    GroupPolicyAttachment(GroupPolicyAttachment),
    #[serde(rename = "aws_iam_policy")]
    Policy(ManagedPolicy),
}

impl Resource {
    pub const fn resource_type(&self) -> &'static str {
        match self {
            Self::User(_) => USER_TYPE,
            Self::LoginProfile(_) => LOGIN_PROFILE_TYPE,
            Self::AccessKey(_) => ACCESS_KEY_TYPE,
            Self::UserPolicyAttachment(_) => USER_POLICY_ATTACHMENT_TYPE,
            Self::UserPolicy(_) => USER_POLICY_TYPE,
            Self::Group(_) => GROUP_TYPE,
            Self::GroupMembership(_) => GROUP_MEMBERSHIP_TYPE,
            Self::GroupPolicyAttachment(_) => GROUP_POLICY_ATTACHMENT_TYPE,
            Self::Policy(_) => POLICY_TYPE,
        }
    }
}

/// A resource together with its address in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedResource {
    pub address: Address,
    #[serde(flatten)]
    pub resource: Resource,
}

impl PlannedResource {
    pub fn new(label: impl Into<String>, resource: Resource) -> Self {
        Self {
            address: Address::new(resource.resource_type(), label),
            resource,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserOutput {
    pub name: String,
    pub arn: AttributeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<AttributeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<AttributeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<AttributeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupOutput {
    pub name: String,
    pub arn: AttributeRef,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanOutputs {
    pub users: Vec<UserOutput>,
    pub groups: Vec<GroupOutput>,
}

/// Everything one evaluation produces, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourcePlan {
    pub resources: Vec<PlannedResource>,
    pub outputs: PlanOutputs,
}

impl ResourcePlan {
    pub fn of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = &'a PlannedResource> + 'a {
        self.resources
            .iter()
            .filter(move |r| r.address.resource_type == resource_type)
    }

    pub fn get(&self, address: &Address) -> Option<&PlannedResource> {
        self.resources.iter().find(|r| &r.address == address)
    }

    pub fn users(&self) -> impl Iterator<Item = &ManagedUser> {
        self.resources.iter().filter_map(|r| match &r.resource {
            Resource::User(u) => Some(u),
            _ => None,
        })
    }

    pub fn login_profiles(&self) -> impl Iterator<Item = &LoginProfile> {
        self.resources.iter().filter_map(|r| match &r.resource {
            Resource::LoginProfile(p) => Some(p),
            _ => None,
        })
    }

    pub fn access_keys(&self) -> impl Iterator<Item = &AccessKey> {
        self.resources.iter().filter_map(|r| match &r.resource {
            Resource::AccessKey(k) => Some(k),
            _ => None,
        })
    }

    pub fn user_policy_attachments(&self) -> impl Iterator<Item = &UserPolicyAttachment> {
        self.resources.iter().filter_map(|r| match &r.resource {
            Resource::UserPolicyAttachment(a) => Some(a),
            _ => None,
        })
    }

    pub fn user_policies(&self) -> impl Iterator<Item = &UserPolicy> {
        self.resources.iter().filter_map(|r| match &r.resource {
            Resource::UserPolicy(p) => Some(p),
            _ => None,
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = &ManagedGroup> {
        self.resources.iter().filter_map(|r| match &r.resource {
            Resource::Group(g) => Some(g),
            _ => None,
        })
    }

    pub fn group_memberships(&self) -> impl Iterator<Item = &GroupMembership> {
        self.resources.iter().filter_map(|r| match &r.resource {
            Resource::GroupMembership(m) => Some(m),
            _ => None,
        })
    }

    pub fn group_policy_attachments(&self) -> impl Iterator<Item = &GroupPolicyAttachment> {
        self.resources.iter().filter_map(|r| match &r.resource {
            Resource::GroupPolicyAttachment(a) => Some(a),
            _ => None,
        })
    }

    pub fn managed_policies(&self) -> impl Iterator<Item = &ManagedPolicy> {
        self.resources.iter().filter_map(|r| match &r.resource {
            Resource::Policy(p) => Some(p),
            _ => None,
        })
    }

    /// Inline policy `policy_name` of `user`, if the plan has one.
    pub fn user_policy(&self, user: &str, policy_name: &str) -> Option<&UserPolicy> {
        self.user_policies()
            .find(|p| p.user == user && p.name == policy_name)
    }
}
