//! Plan creation for the provisioning service

use log::{debug, info};

use crate::aws::sts::caller_identity;
use crate::context::{AwsContext, SynthesisOptions, DEFAULT_PARTITION};
use crate::error::{SynthesisError, SynthesisResult};
use crate::inventory::Inventory;
use crate::resources::ResourcePlan;
use crate::synthesis::synthesize;

/// Operator input for one evaluation besides the inventory itself.
#[derive(Debug, Clone, Default)]
pub struct PlanRequest {
    /// Overrides the account of the current credentials.
    pub account_id: Option<String>,
    /// Overrides the partition; defaults to the caller's, or `aws`.
    pub partition: Option<String>,
    pub options: SynthesisOptions,
}

impl super::service::ProvisioningService {
    /// Resolve the account context and synthesize the plan for `inventory`.
    pub async fn plan(
        &self,
        inventory: &Inventory,
        request: PlanRequest,
    ) -> SynthesisResult<ResourcePlan> {
        let ctx = self
            .resolve_context(request.account_id, request.partition)
            .await?;
        synthesize(&ctx, &request.options, inventory)
    }

    /// An operator-supplied account id wins over the caller identity.
    pub async fn resolve_context(
        &self,
        account_id: Option<String>,
        partition: Option<String>,
    ) -> SynthesisResult<AwsContext> {
        if let Some(account_id) = account_id {
            debug!("Using operator-supplied account id {}", account_id);
            let partition = partition.unwrap_or_else(|| DEFAULT_PARTITION.to_string());
            return AwsContext::new(partition, account_id);
        }

        let client = self.sts_client.as_ref().ok_or_else(|| {
            SynthesisError::configuration_at(
                "account_id",
                "no account id given and no AWS credentials configured",
            )
        })?;
        let identity = caller_identity(client).await?;
        info!(
            "Resolved account {} ({}) from caller identity",
            identity.account, identity.partition
        );
        AwsContext::new(partition.unwrap_or(identity.partition), identity.account)
    }
}
