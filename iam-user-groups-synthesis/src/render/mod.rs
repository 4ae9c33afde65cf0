//! Renderers that turn a [`ResourcePlan`](crate::ResourcePlan) into input for
//! an external provisioning engine.

pub mod terraform;
