//! Commands module - service layer for plan operations

mod plan;
pub(crate) mod service;

pub use plan::PlanRequest;
pub use service::ProvisioningService;
