//! Default filling.
//!
//! Resolution turns a decoded document into one where every default is
//! explicit. Managers and pools keep their declared order; nothing is
//! reordered or deduplicated, since violations are reported by index.

use tracing::{debug, info};

use crate::error::Result;
use crate::manager::{
    AgentResourceManagerConfig, DispatcherResourceManagerConfig, KubernetesResourceManagerConfig,
    ResourceManagerConfig, SlotType, DEFAULT_CLUSTER_NAME, DEFAULT_LAUNCHER_PORT,
    DEFAULT_LAUNCHER_PROTOCOL,
};
use crate::pool::{
    ResourcePoolConfig, AGENT_RECONNECT_WAIT, DEFAULT_MAX_AUX_CONTAINERS_PER_AGENT,
    DEFAULT_POOL_NAME,
};
use crate::resource_config::{Config, ResourceConfig};
use crate::scheduler::{FittingPolicy, SchedulerConfig, SchedulingPolicy};

impl Config {
    /// Fill every default in place.
    ///
    /// # Errors
    ///
    /// Returns a structural error if the document's shape cannot be
    /// normalized; default filling itself never fails.
    pub fn resolve(&mut self) -> Result<()> {
        self.resource_config.resolve()
    }
}

impl ResourceConfig {
    /// Fill every default in place. Resolving twice is a no-op.
    ///
    /// # Errors
    ///
    /// See [`Config::resolve`].
    pub fn resolve(&mut self) -> Result<()> {
        self.normalize()?;

        let root = self.root_manager.get_or_insert_with(|| {
            info!("no resource manager configured, using an agent resource manager");
            ResourceManagerConfig::Agent(AgentResourceManagerConfig::default())
        });
        let cluster_name = root.cluster_name_mut();
        if cluster_name.is_empty() {
            *cluster_name = DEFAULT_CLUSTER_NAME.to_string();
        }
        root.resolve();

        if self.root_pools.is_empty() {
            info!(pool = DEFAULT_POOL_NAME, "no resource pools configured, creating one");
            self.root_pools.push(ResourcePoolConfig::synthesized_default());
        } else {
            self.root_pools.iter_mut().for_each(ResourcePoolConfig::resolve);
        }

        for (index, entry) in self.additional_resource_managers.iter_mut().enumerate() {
            debug!(
                index,
                name = entry.resource_manager.name(),
                kind = %entry.resource_manager.kind(),
                "resolving additional resource manager"
            );
            entry.resource_manager.resolve();
            entry.resource_pools.iter_mut().for_each(ResourcePoolConfig::resolve);
        }

        Ok(())
    }
}

impl ResourceManagerConfig {
    fn resolve(&mut self) {
        match self {
            Self::Agent(agent) => agent.resolve(),
            Self::Kubernetes(kubernetes) => kubernetes.resolve(),
            Self::Dispatcher(dispatcher) => dispatcher.resolve(),
        }
    }
}

fn default_pool_name(pool: &mut String) {
    if pool.is_empty() {
        *pool = DEFAULT_POOL_NAME.to_string();
    }
}

impl AgentResourceManagerConfig {
    fn resolve(&mut self) {
        default_pool_name(&mut self.default_aux_resource_pool);
        default_pool_name(&mut self.default_compute_resource_pool);
        self.scheduler
            .get_or_insert_with(SchedulerConfig::platform_default)
            .resolve();
    }
}

impl KubernetesResourceManagerConfig {
    fn resolve(&mut self) {
        default_pool_name(&mut self.default_aux_resource_pool);
        default_pool_name(&mut self.default_compute_resource_pool);
        self.slot_type.get_or_insert(SlotType::Cuda);
    }
}

impl DispatcherResourceManagerConfig {
    fn resolve(&mut self) {
        default_pool_name(&mut self.default_aux_resource_pool);
        default_pool_name(&mut self.default_compute_resource_pool);
        self.launcher_port.get_or_insert(DEFAULT_LAUNCHER_PORT);
        if self.launcher_protocol.is_empty() {
            self.launcher_protocol = DEFAULT_LAUNCHER_PROTOCOL.to_string();
        }
    }
}

impl ResourcePoolConfig {
    /// Fill the defaults of a declared pool.
    ///
    /// `max_cpu_containers_per_agent` is deliberately left alone: the
    /// unlimited cap only applies to the synthesized default pool.
    fn resolve(&mut self) {
        self.max_aux_containers_per_agent
            .get_or_insert(DEFAULT_MAX_AUX_CONTAINERS_PER_AGENT);
        self.agent_reconnect_wait.get_or_insert(AGENT_RECONNECT_WAIT);
        if let Some(scheduler) = &mut self.scheduler {
            scheduler.resolve();
        }
    }
}

impl SchedulerConfig {
    /// Fair-share always packs with best fit, whatever was requested.
    fn resolve(&mut self) {
        if self.policy == SchedulingPolicy::FairShare {
            self.fitting_policy = FittingPolicy::Best;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::ManagerKind;
    use crate::resource_config::ResourceManagerWithPools;

    fn resolved(yaml: &str) -> Config {
        let mut config = Config::from_yaml(yaml).unwrap();
        config.resolve().unwrap();
        config
    }

    #[test]
    fn empty_document_gets_agent_and_default_pool() {
        let config = resolved("{}");
        let resources = &config.resource_config;

        let expected_agent = AgentResourceManagerConfig {
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
            default_aux_resource_pool: "default".to_string(),
            default_compute_resource_pool: "default".to_string(),
            scheduler: Some(SchedulerConfig::platform_default()),
            ..AgentResourceManagerConfig::default()
        };
        assert_eq!(
            resources.root_manager,
            Some(ResourceManagerConfig::Agent(expected_agent))
        );
        assert_eq!(resources.root_pools, vec![ResourcePoolConfig::synthesized_default()]);
        assert!(resources.additional_resource_managers.is_empty());
    }

    #[test]
    fn fair_share_forces_best_fit() {
        let config = resolved(
            "resource_manager:\n  type: agent\n  scheduler:\n    type: fair_share\n    fitting_policy: worst\n",
        );
        let agent = config
            .resource_config
            .agent_rm_config()
            .and_then(|entry| entry.manager.as_agent())
            .cloned()
            .unwrap();
        assert_eq!(
            agent.scheduler,
            Some(SchedulerConfig::new(SchedulingPolicy::FairShare))
        );
    }

    #[test]
    fn worst_fit_kept_for_other_policies() {
        let config = resolved(
            "resource_manager:\n  type: agent\n  scheduler:\n    type: round_robin\n    fitting_policy: worst\n",
        );
        let scheduler = config
            .resource_config
            .root_manager
            .as_ref()
            .and_then(|m| m.as_agent())
            .and_then(|a| a.scheduler.clone())
            .unwrap();
        assert_eq!(scheduler.fitting_policy, FittingPolicy::Worst);
    }

    #[test]
    fn declared_pools_do_not_get_unlimited_cpu() {
        let config = resolved("resource_pools:\n  - pool_name: test\n  - pool_name: test2\n");
        for pool in &config.resource_config.root_pools {
            assert_eq!(pool.max_aux_containers_per_agent, Some(100));
            assert_eq!(pool.max_cpu_containers_per_agent, None);
            assert_eq!(pool.agent_reconnect_wait, Some(AGENT_RECONNECT_WAIT));
        }
    }

    #[test]
    fn explicit_pool_values_are_kept() {
        let config = resolved(
            "resource_pools:\n  - pool_name: a\n    max_aux_containers_per_agent: 3\n    agent_reconnect_wait: 1m\n",
        );
        let pool = &config.resource_config.root_pools[0];
        assert_eq!(pool.max_aux_containers_per_agent, Some(3));
        assert_eq!(pool.agent_reconnect_wait.map(|d| d.to_string()).as_deref(), Some("1m"));
    }

    #[test]
    fn additional_kubernetes_defaults() {
        let config = resolved(
            "additional_resource_managers:\n\
             \x20 - resource_manager:\n\
             \x20     type: kubernetes\n\
             \x20     cluster_name: c2\n\
             \x20     max_slots_per_pod: 65\n\
             \x20   resource_pools:\n\
             \x20     - pool_name: c\n",
        );
        let ResourceManagerWithPools {
            resource_manager,
            resource_pools,
        } = &config.resource_config.additional_resource_managers[0];
        let kubernetes = resource_manager.as_kubernetes().unwrap();
        assert_eq!(kubernetes.slot_type, Some(SlotType::Cuda));
        assert_eq!(kubernetes.default_aux_resource_pool, "default");
        assert_eq!(kubernetes.default_compute_resource_pool, "default");
        assert_eq!(kubernetes.cluster_name, "c2");
        assert_eq!(resource_pools[0].max_aux_containers_per_agent, Some(100));
        assert_eq!(resource_pools[0].max_cpu_containers_per_agent, None);
    }

    #[test]
    fn additional_manager_cluster_name_is_not_defaulted() {
        let config = resolved(
            "additional_resource_managers:\n  - resource_manager:\n      type: kubernetes\n      max_slots_per_pod: 1\n",
        );
        let entry = &config.resource_config.additional_resource_managers[0];
        assert_eq!(entry.resource_manager.cluster_name(), "");
        assert!(entry.resource_pools.is_empty());
    }

    #[test]
    fn root_kubernetes_and_dispatcher_defaults() {
        let kubernetes =
            resolved("resource_manager:\n  type: kubernetes\n  max_slots_per_pod: 1\n");
        let root = kubernetes.resource_config.root_manager.as_ref().unwrap();
        assert_eq!(root.kind(), ManagerKind::Kubernetes);
        assert_eq!(root.cluster_name(), DEFAULT_CLUSTER_NAME);

        let dispatcher = resolved("resource_manager:\n  type: dispatcher\n  cluster_name: hpc\n");
        match dispatcher.resource_config.root_manager {
            Some(ResourceManagerConfig::Dispatcher(d)) => {
                assert_eq!(d.cluster_name, "hpc");
                assert_eq!(d.launcher_port, Some(DEFAULT_LAUNCHER_PORT));
                assert_eq!(d.launcher_protocol, "http");
            }
            other => panic!("expected dispatcher, got {other:?}"),
        }
    }

    #[test]
    fn resolve_is_idempotent() {
        for yaml in [
            "{}",
            "resource_manager:\n  type: agent\n  scheduler:\n    type: fair_share\n",
            "resource_pools:\n  - pool_name: a\n  - pool_name: b\n",
            "scheduler:\n  type: round_robin\n",
        ] {
            let once = resolved(yaml);
            let mut twice = once.clone();
            twice.resolve().unwrap();
            assert_eq!(once, twice, "resolving twice changed {yaml:?}");
        }
    }

    #[test]
    fn order_is_preserved() {
        let config = resolved(
            "resource_pools:\n  - pool_name: z\n  - pool_name: a\n  - pool_name: z\n",
        );
        let names: Vec<_> = config
            .resource_config
            .all_pools()
            .map(|p| p.pool_name.as_str())
            .collect();
        assert_eq!(names, ["z", "a", "z"]);
    }
}
