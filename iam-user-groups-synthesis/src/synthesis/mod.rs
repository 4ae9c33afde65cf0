//! Turns a validated inventory into a [`ResourcePlan`].
//!
//! Users are processed in input order, then groups in input order. Each spec
//! is evaluated independently, so the plan for an inventory is the
//! concatenation of the per-spec plans.

mod groups;
pub mod policy_builder;
mod users;

use log::info;

use crate::context::{AwsContext, SynthesisOptions};
use crate::error::SynthesisResult;
use crate::inventory::Inventory;
use crate::resources::ResourcePlan;
use crate::validation::validate;

pub use groups::{assumable_roles_policy_name, membership_name};

/// Validate `inventory` and synthesize the resources for every enabled user
/// and every group.
///
/// Nothing is produced when validation fails. The same inputs always yield
/// the same plan.
pub fn synthesize(
    ctx: &AwsContext,
    options: &SynthesisOptions,
    inventory: &Inventory,
) -> SynthesisResult<ResourcePlan> {
    validate(inventory, options)?;

    let mut plan = ResourcePlan::default();
    for user in &inventory.users {
        if let Some(out) = users::synthesize_user(ctx, options.pgp_key.as_ref(), user)? {
            plan.resources.extend(out.resources);
            plan.outputs.users.push(out.output);
        }
    }
    for group in &inventory.groups {
        let out = groups::synthesize_group(group);
        plan.resources.extend(out.resources);
        plan.outputs.groups.push(out.output);
    }

    info!(
        "Synthesized {} resources for {} users and {} groups in account {}",
        plan.resources.len(),
        plan.outputs.users.len(),
        plan.outputs.groups.len(),
        ctx.account_id()
    );
    Ok(plan)
}
