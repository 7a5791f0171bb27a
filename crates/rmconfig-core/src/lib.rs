//! Resource manager and resource pool configuration.
//!
//! This crate turns a decoded configuration document into the canonical,
//! fully defaulted set of resource managers and pools the scheduler and the
//! cluster clients work from:
//!
//! - **Models**: [`ResourceManagerConfig`] (agent, Kubernetes or dispatcher
//!   backed), [`ResourcePoolConfig`], [`SchedulerConfig`]
//! - **Resolution**: [`Config::resolve`] fills every default and folds
//!   legacy single-manager fields into the canonical shape
//! - **Validation**: [`Config::validate`] reports every violated rule with
//!   the path of the offending node
//! - **Accessors**: [`ResourceConfig::resource_managers`],
//!   [`ResourceConfig::kubernetes_cluster_names`] and
//!   [`ResourceConfig::agent_rm_config`]
//!
//! # Violation paths
//!
//! Paths in a validation report are spelled with the document's own keys,
//! not Rust field names: `root.resource_config.resource_pools[1]`, with a
//! resource manager addressed by its `type` tag, as in
//! `root.resource_config.resource_manager.kubernetes.internal_task_gateway`.
//! Rules that inspect the whole document run at both `root` and
//! `root.resource_config`, so each of their findings is listed twice.
//!
//! ```
//! use rmconfig_core::Config;
//!
//! let yaml = "
//! resource_manager:
//!   type: kubernetes
//!   max_slots_per_pod: 1
//!   slot_type: rocm
//! ";
//!
//! let mut config = Config::from_yaml(yaml).unwrap();
//! config.resolve().unwrap();
//!
//! let report = config.validate().unwrap_err();
//! let paths: Vec<_> = report.violations().iter().map(|v| v.path.as_str()).collect();
//! assert_eq!(paths, ["root.resource_config.resource_manager.kubernetes"]);
//! ```
//!
//! # Example
//!
//! ```
//! use rmconfig_core::Config;
//!
//! let yaml = "
//! resource_manager:
//!   type: agent
//! resource_pools:
//!   - pool_name: a
//!   - pool_name: a
//! ";
//!
//! let mut config = Config::from_yaml(yaml).unwrap();
//! config.resolve().unwrap();
//!
//! let report = config.validate().unwrap_err();
//! assert_eq!(report.len(), 2);
//! assert!(report.to_string().contains("duplicate name: a"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod duration;
pub mod error;
pub mod manager;
pub mod pool;
mod resolve;
pub mod resource_config;
pub mod scheduler;
pub mod validate;

pub use duration::HumanDuration;
pub use error::{ConfigError, Result};
pub use manager::{
    AgentResourceManagerConfig, DispatcherResourceManagerConfig, InternalTaskGatewayConfig,
    KubernetesResourceManagerConfig, ManagerKind, ResourceManagerConfig, SlotResourceRequests,
    SlotType, DEFAULT_CLUSTER_NAME, DEFAULT_LAUNCHER_PORT, DEFAULT_LAUNCHER_PROTOCOL,
};
pub use pool::{
    ResourcePoolConfig, AGENT_RECONNECT_WAIT, DEFAULT_MAX_AUX_CONTAINERS_PER_AGENT,
    DEFAULT_POOL_NAME, UNLIMITED_CPU_CONTAINERS,
};
pub use resource_config::{Config, ManagerPools, ResourceConfig, ResourceManagerWithPools};
pub use rmconfig_check::Report;
pub use scheduler::{
    FittingPolicy, PriorityParams, SchedulerConfig, SchedulerKind, SchedulingPolicy,
    DEFAULT_SCHEDULING_PRIORITY, MAX_SCHEDULING_PRIORITY, MIN_SCHEDULING_PRIORITY,
};
pub use validate::registry;
