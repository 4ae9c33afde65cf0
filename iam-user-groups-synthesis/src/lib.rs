//! This crate provides the core logic for provisioning IAM users and groups:
//! - Inventory loading and validation
//! - Policy synthesis into a deterministic resource plan
//! - Terraform JSON rendering of the plan
//! - Account context resolution through STS
//!
//! Synthesis itself is pure. Given an [`AwsContext`], [`SynthesisOptions`] and
//! an [`Inventory`], [`synthesize`] always returns the same [`ResourcePlan`].

pub mod arn;
pub mod aws;
pub mod commands;
mod context;
mod error;
mod inventory;
pub mod render;
pub mod resources;
pub mod secrets;
pub mod synthesis;
pub mod types;
mod validation;

// Re-exports for a small, focused public API
pub use aws::sts::{caller_identity, CallerIdentity};
pub use aws::{AwsError, AwsResult};
pub use commands::{PlanRequest, ProvisioningService};
pub use context::{AwsContext, MembershipCheck, PgpKey, SynthesisOptions, DEFAULT_PARTITION};
pub use error::{SynthesisError, SynthesisResult};
pub use inventory::{GroupSpec, Inventory, UserSpec, DEFAULT_PASSWORD_LENGTH};
pub use resources::{
    Address, AttributeRef, GroupOutput, PlanOutputs, PlannedResource, Resource, ResourcePlan,
    UserOutput,
};
pub use secrets::{SealedSecret, SecretSealer};
pub use synthesis::synthesize;
pub use types::{PolicyDocument, Statement};
pub use validation::{
    validate, ValidationReport, MAX_GROUP_NAME_LEN, MAX_PASSWORD_LENGTH, MAX_USER_NAME_LEN,
};
