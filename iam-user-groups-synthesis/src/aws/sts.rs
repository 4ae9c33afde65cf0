use aws_sdk_sts::Client as StsClient;

use crate::arn::{account_from_arn, partition_from_arn};
use crate::aws::{AwsError, AwsResult};

/// Account and partition of the current credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account: String,
    pub partition: String,
}

impl CallerIdentity {
    /// Build from the `Account` and `Arn` fields of a GetCallerIdentity response.
    ///
    /// The partition is taken from the caller ARN. The account comes from
    /// `Account` when present, else from the ARN.
    pub fn from_response(account: Option<&str>, arn: Option<&str>) -> AwsResult<Self> {
        let arn = arn.ok_or_else(|| {
            AwsError::IdentityError("STS GetCallerIdentity missing Arn".to_string())
        })?;
        let partition = partition_from_arn(arn).ok_or_else(|| {
            AwsError::IdentityError(format!("Cannot read partition from caller ARN '{}'", arn))
        })?;
        let account = account
            .or_else(|| account_from_arn(arn))
            .ok_or_else(|| {
                AwsError::IdentityError("STS GetCallerIdentity missing Account".to_string())
            })?;
        Ok(Self {
            account: account.to_string(),
            partition: partition.to_string(),
        })
    }
}

/// Resolve the caller's account and partition using STS GetCallerIdentity.
pub async fn caller_identity(client: &StsClient) -> AwsResult<CallerIdentity> {
    let out = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| AwsError::SdkError(format!("STS GetCallerIdentity failed: {}", e)))?;
    CallerIdentity::from_response(out.account(), out.arn())
}
