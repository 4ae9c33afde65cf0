//! Provisioning service layer
//!
//! Holds the AWS clients needed to resolve the account context and exposes
//! the high-level operations used by the CLI.

use aws_sdk_sts::Client as StsClient;

use crate::error::SynthesisResult;

pub struct ProvisioningService {
    pub(crate) sts_client: Option<StsClient>,
}

impl ProvisioningService {
    /// Create a service backed by the default AWS credential provider chain.
    ///
    /// # Errors
    ///
    /// Returns an error if AWS SDK configuration fails to load.
    pub async fn new() -> SynthesisResult<Self> {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;

        Ok(Self {
            sts_client: Some(StsClient::new(&config)),
        })
    }

    /// A service without AWS clients. Every request must carry an account id.
    pub fn offline() -> Self {
        Self { sts_client: None }
    }

    // plan() is implemented in plan.rs
}
