//! Resource manager configuration.
//!
//! A resource manager is the backend that supplies compute to the scheduler.
//! Exactly one backend is selected per manager, by the `type` tag:
//!
//! ```yaml
//! type: kubernetes
//! name: gpu-cluster
//! cluster_name: us-east
//! max_slots_per_pod: 8
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::scheduler::SchedulerConfig;

/// Cluster name given to the root manager when it does not declare one.
pub const DEFAULT_CLUSTER_NAME: &str = "default";

/// Launcher port used by dispatcher managers that do not set one.
pub const DEFAULT_LAUNCHER_PORT: u16 = 8181;

/// Launcher protocol used by dispatcher managers that do not set one.
pub const DEFAULT_LAUNCHER_PROTOCOL: &str = "http";

/// Backend of a resource manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceManagerConfig {
    /// A fleet of agents that connect to the master.
    Agent(AgentResourceManagerConfig),
    /// A Kubernetes cluster.
    Kubernetes(KubernetesResourceManagerConfig),
    /// An HPC launcher (Slurm/PBS) reached through a dispatcher.
    Dispatcher(DispatcherResourceManagerConfig),
}

/// Discriminator of [`ResourceManagerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerKind {
    /// `agent`
    Agent,
    /// `kubernetes`
    Kubernetes,
    /// `dispatcher`
    Dispatcher,
}

impl ManagerKind {
    /// The tag as written in documents.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Kubernetes => "kubernetes",
            Self::Dispatcher => "dispatcher",
        }
    }
}

impl fmt::Display for ManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ResourceManagerConfig {
    /// Build a manager from one optional payload per backend.
    ///
    /// # Errors
    ///
    /// Returns a structural error unless exactly one payload is given.
    pub fn from_parts(
        agent: Option<AgentResourceManagerConfig>,
        kubernetes: Option<KubernetesResourceManagerConfig>,
        dispatcher: Option<DispatcherResourceManagerConfig>,
    ) -> Result<Self> {
        match (agent, kubernetes, dispatcher) {
            (Some(agent), None, None) => Ok(Self::Agent(agent)),
            (None, Some(kubernetes), None) => Ok(Self::Kubernetes(kubernetes)),
            (None, None, Some(dispatcher)) => Ok(Self::Dispatcher(dispatcher)),
            (agent, kubernetes, dispatcher) => {
                let given = [agent.is_some(), kubernetes.is_some(), dispatcher.is_some()]
                    .into_iter()
                    .filter(|given| *given)
                    .count();
                Err(ConfigError::structural(format!(
                    "exactly one resource manager type must be specified, got {given}"
                )))
            }
        }
    }

    /// Which backend this is.
    #[must_use]
    pub const fn kind(&self) -> ManagerKind {
        match self {
            Self::Agent(_) => ManagerKind::Agent,
            Self::Kubernetes(_) => ManagerKind::Kubernetes,
            Self::Dispatcher(_) => ManagerKind::Dispatcher,
        }
    }

    /// The manager's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Agent(c) => &c.name,
            Self::Kubernetes(c) => &c.name,
            Self::Dispatcher(c) => &c.name,
        }
    }

    /// The cluster the manager's resources belong to.
    #[must_use]
    pub fn cluster_name(&self) -> &str {
        match self {
            Self::Agent(c) => &c.cluster_name,
            Self::Kubernetes(c) => &c.cluster_name,
            Self::Dispatcher(c) => &c.cluster_name,
        }
    }

    pub(crate) fn cluster_name_mut(&mut self) -> &mut String {
        match self {
            Self::Agent(c) => &mut c.cluster_name,
            Self::Kubernetes(c) => &mut c.cluster_name,
            Self::Dispatcher(c) => &mut c.cluster_name,
        }
    }

    /// Operator-supplied labels.
    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, String> {
        match self {
            Self::Agent(c) => &c.metadata,
            Self::Kubernetes(c) => &c.metadata,
            Self::Dispatcher(c) => &c.metadata,
        }
    }

    /// The agent settings, if this is an agent manager.
    #[must_use]
    pub const fn as_agent(&self) -> Option<&AgentResourceManagerConfig> {
        match self {
            Self::Agent(c) => Some(c),
            Self::Kubernetes(_) | Self::Dispatcher(_) => None,
        }
    }

    /// The Kubernetes settings, if this is a Kubernetes manager.
    #[must_use]
    pub const fn as_kubernetes(&self) -> Option<&KubernetesResourceManagerConfig> {
        match self {
            Self::Kubernetes(c) => Some(c),
            Self::Agent(_) | Self::Dispatcher(_) => None,
        }
    }
}

impl Default for ResourceManagerConfig {
    fn default() -> Self {
        Self::Agent(AgentResourceManagerConfig::default())
    }
}

/// Settings of an agent-fleet manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentResourceManagerConfig {
    /// Manager name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Cluster name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cluster_name: String,

    /// Operator-supplied labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    /// Scheduler used for pools that do not override it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<SchedulerConfig>,

    /// Pool auxiliary tasks land in when none is requested.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_aux_resource_pool: String,

    /// Pool compute tasks land in when none is requested.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_compute_resource_pool: String,

    /// Whether agents must present credentials when connecting.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub require_authentication: bool,
}

/// Device type a slot maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    /// NVIDIA GPU.
    #[default]
    Cuda,
    /// CPU-only slot.
    Cpu,
    /// AMD GPU.
    Rocm,
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cuda => "cuda",
            Self::Cpu => "cpu",
            Self::Rocm => "rocm",
        })
    }
}

/// Per-slot resource requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotResourceRequests {
    /// CPUs requested per slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f32>,
}

impl SlotResourceRequests {
    fn is_unset(&self) -> bool {
        self.cpu.is_none()
    }
}

/// Ingress exposing internally scheduled tasks within a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InternalTaskGatewayConfig {
    /// Gateway resource name.
    #[serde(default)]
    pub gateway_name: String,

    /// Namespace of the gateway resource.
    #[serde(default)]
    pub gateway_namespace: String,

    /// Address the gateway is reachable at.
    #[serde(default)]
    pub gateway_ip: String,

    /// First port handed out to tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_port_range_start: Option<u16>,

    /// Last port handed out to tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_port_range_end: Option<u16>,
}

/// Settings of a Kubernetes-backed manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KubernetesResourceManagerConfig {
    /// Manager name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Cluster name; required.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cluster_name: String,

    /// Operator-supplied labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    /// Namespace jobs are launched in when the pool does not set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Largest number of slots a single pod may hold; required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_slots_per_pod: Option<i32>,

    /// Service name tasks use to reach the master.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_service_name: Option<String>,

    /// Device type of a slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_type: Option<SlotType>,

    /// Resources requested per slot.
    #[serde(default, skip_serializing_if = "SlotResourceRequests::is_unset")]
    pub slot_resource_requests: SlotResourceRequests,

    /// Kubernetes scheduler name pods are submitted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_scheduler: Option<String>,

    /// Path of the kubeconfig used to reach the cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig_path: Option<String>,

    /// Keep pods and services around after tasks exit.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub leave_kubernetes_resources: bool,

    /// Pool auxiliary tasks land in when none is requested.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_aux_resource_pool: String,

    /// Pool compute tasks land in when none is requested.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_compute_resource_pool: String,

    /// Ingress for internally scheduled tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_task_gateway: Option<InternalTaskGatewayConfig>,
}

/// Settings of a dispatcher-backed (HPC launcher) manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatcherResourceManagerConfig {
    /// Manager name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Cluster name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cluster_name: String,

    /// Operator-supplied labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    /// Host the launcher listens on.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub launcher_host: String,

    /// Port the launcher listens on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launcher_port: Option<u16>,

    /// `http` or `https`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub launcher_protocol: String,

    /// Device type of a slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_type: Option<SlotType>,

    /// Pool auxiliary tasks land in when none is requested.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_aux_resource_pool: String,

    /// Pool compute tasks land in when none is requested.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_compute_resource_pool: String,
}
