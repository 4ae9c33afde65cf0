//! AWS SDK integration: account context lookup through STS.

pub mod sts;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("AWS SDK error: {0}")]
    SdkError(String),
    #[error("Caller identity error: {0}")]
    IdentityError(String),
}

pub type AwsResult<T> = Result<T, AwsError>;
