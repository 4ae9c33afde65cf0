//! IAM policy document model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const POLICY_VERSION: &str = "2012-10-17";

/// A string or a list of strings, as IAM accepts for actions and resources.
///
/// Single-element lists collapse to `Single` so that rendered documents
/// read the same way IAM and Terraform print them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    Single(String),
    Multiple(Vec<String>),
}

impl OneOrMany {
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(v) => vec![v.as_str()],
            Self::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            Self::Single(values.remove(0))
        } else {
            Self::Multiple(values)
        }
    }
}

impl From<&[&str]> for OneOrMany {
    fn from(values: &[&str]) -> Self {
        values
            .iter()
            .map(|v| (*v).to_string())
            .collect::<Vec<_>>()
            .into()
    }
}

impl From<String> for OneOrMany {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Either `Action` or `NotAction`; a statement carries exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionBlock {
    Action(OneOrMany),
    NotAction(OneOrMany),
}

/// Either `Resource` or `NotResource`; a statement carries exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceBlock {
    Resource(OneOrMany),
    NotResource(OneOrMany),
}

/// Condition block: operator -> condition key -> values.
pub type Condition = BTreeMap<String, BTreeMap<String, OneOrMany>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    #[serde(flatten)]
    pub action: ActionBlock,
    #[serde(flatten)]
    pub resource: ResourceBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Statement {
    pub fn allow(actions: impl Into<OneOrMany>, resources: impl Into<OneOrMany>) -> Self {
        Self {
            sid: None,
            effect: Effect::Allow,
            action: ActionBlock::Action(actions.into()),
            resource: ResourceBlock::Resource(resources.into()),
            condition: None,
        }
    }

    pub fn deny(action: ActionBlock, resource: ResourceBlock) -> Self {
        Self {
            sid: None,
            effect: Effect::Deny,
            action,
            resource,
            condition: None,
        }
    }

    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn with_condition(
        mut self,
        operator: impl Into<String>,
        key: impl Into<String>,
        values: impl Into<OneOrMany>,
    ) -> Self {
        self.condition
            .get_or_insert_with(BTreeMap::new)
            .entry(operator.into())
            .or_default()
            .insert(key.into(), values.into());
        self
    }

    pub fn actions(&self) -> Vec<&str> {
        match &self.action {
            ActionBlock::Action(a) | ActionBlock::NotAction(a) => a.values(),
        }
    }

    pub fn resources(&self) -> Vec<&str> {
        match &self.resource {
            ResourceBlock::Resource(r) | ResourceBlock::NotResource(r) => r.values(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement,
        }
    }

    pub fn statement_by_sid(&self, sid: &str) -> Option<&Statement> {
        self.statement.iter().find(|s| s.sid.as_deref() == Some(sid))
    }

    /// Compact JSON, as stored in the `policy` attribute of IAM resources.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
