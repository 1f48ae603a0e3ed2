//! Provisioning plan generation for RKE2 cluster nodes
//!
//! Given a node's [`ClusterDescriptor`], [`ConfigEmitter::build_plan`]
//! produces the declarative stages the host executor runs at boot: write
//! the config fragments and proxy environment, merge the fragments into
//! the final RKE2 config, optionally import bundled images, then enable
//! and restart the node's service.

pub mod cluster;
pub mod constants;
pub mod emitter;
pub mod error;
pub mod network;
pub mod proxy;
pub mod role;

pub use cluster::{ClusterDescriptor, NodeConfig, Role};
pub use constants::{ProviderPath, SystemService};
pub use emitter::{ConfigEmitter, build_plan, merge_command};
pub use error::{Error, Result};
pub use network::{InterfaceAddress, InterfaceProbe, StaticProbe, SystemProbe};
pub use proxy::{ProxySettings, compute_proxy_env};
pub use role::RoleConfig;
