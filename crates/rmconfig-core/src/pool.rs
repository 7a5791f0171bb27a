//! Resource pool configuration.

use serde::{Deserialize, Serialize};

use crate::duration::HumanDuration;
use crate::scheduler::SchedulerConfig;

/// Name of the pool synthesized when none is declared.
pub const DEFAULT_POOL_NAME: &str = "default";

/// Auxiliary containers an agent may run when the pool does not say.
pub const DEFAULT_MAX_AUX_CONTAINERS_PER_AGENT: u32 = 100;

/// `max_cpu_containers_per_agent` value meaning "no limit".
pub const UNLIMITED_CPU_CONTAINERS: i32 = -1;

/// How long a disconnected agent's containers are kept before being
/// considered lost.
pub const AGENT_RECONNECT_WAIT: HumanDuration = HumanDuration::from_secs(25);

/// Static settings of one scheduling domain.
///
/// Optional fields are filled by resolution; after it,
/// `max_aux_containers_per_agent` and `agent_reconnect_wait` are always set,
/// while `max_cpu_containers_per_agent` is only set on a synthesized pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourcePoolConfig {
    /// Pool name, unique across every resource manager.
    #[serde(default)]
    pub pool_name: String,

    /// Free-form description shown to users.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Cap on auxiliary (non-slot) containers per agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_aux_containers_per_agent: Option<u32>,

    /// Cap on CPU-only containers per agent; `-1` is unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cpu_containers_per_agent: Option<i32>,

    /// Grace period for a disconnected agent to come back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_reconnect_wait: Option<HumanDuration>,

    /// Whether containers survive an agent restart and are reattached.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub agent_reattach_enabled: bool,

    /// Scheduler override for this pool only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<SchedulerConfig>,

    /// Kubernetes namespace jobs of this pool are launched in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_namespace: Option<String>,
}

impl ResourcePoolConfig {
    /// A pool with only its name set.
    #[must_use]
    pub fn named(pool_name: impl Into<String>) -> Self {
        Self {
            pool_name: pool_name.into(),
            ..Self::default()
        }
    }

    /// The pool created when an operator declares none at all.
    ///
    /// This is the only place the unlimited CPU-container cap is applied.
    #[must_use]
    pub fn synthesized_default() -> Self {
        Self {
            pool_name: DEFAULT_POOL_NAME.to_string(),
            max_aux_containers_per_agent: Some(DEFAULT_MAX_AUX_CONTAINERS_PER_AGENT),
            max_cpu_containers_per_agent: Some(UNLIMITED_CPU_CONTAINERS),
            agent_reconnect_wait: Some(AGENT_RECONNECT_WAIT),
            ..Self::default()
        }
    }

    /// Effective auxiliary container cap.
    #[must_use]
    pub fn max_aux_containers(&self) -> u32 {
        self.max_aux_containers_per_agent
            .unwrap_or(DEFAULT_MAX_AUX_CONTAINERS_PER_AGENT)
    }

    /// Effective CPU container cap; `None` means unlimited.
    #[must_use]
    pub fn max_cpu_containers(&self) -> Option<u32> {
        match self.max_cpu_containers_per_agent {
            Some(UNLIMITED_CPU_CONTAINERS) => None,
            Some(n) => u32::try_from(n).ok(),
            None => Some(0),
        }
    }

    /// Effective reconnect grace period.
    #[must_use]
    pub fn reconnect_wait(&self) -> HumanDuration {
        self.agent_reconnect_wait.unwrap_or(AGENT_RECONNECT_WAIT)
    }
}
