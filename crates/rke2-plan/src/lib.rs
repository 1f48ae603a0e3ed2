//! Declarative provisioning plan
//!
//! A plan is what the host executor consumes: named phases, each an ordered
//! list of stages that write files and run shell commands.

pub mod error;
pub mod schema;

pub use error::{Error, Result};
pub use schema::{FileWrite, ProvisioningPlan, Stage};
