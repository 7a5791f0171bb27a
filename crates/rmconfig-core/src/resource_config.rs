//! The resource configuration aggregate and its read-side accessors.
//!
//! A document declares one root manager with its pools at the top level
//! (the single-manager shape older documents use) and any number of
//! additional managers, each with its own pools:
//!
//! ```yaml
//! resource_manager:
//!   type: agent
//! resource_pools:
//!   - pool_name: a
//! additional_resource_managers:
//!   - resource_manager:
//!       type: kubernetes
//!       name: gpu
//!       cluster_name: gpu
//!       max_slots_per_pod: 8
//!     resource_pools:
//!       - pool_name: b
//! ```
//!
//! Everything downstream iterates the flattened form returned by
//! [`ResourceConfig::resource_managers`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::manager::{AgentResourceManagerConfig, ResourceManagerConfig};
use crate::pool::ResourcePoolConfig;
use crate::scheduler::SchedulerConfig;

/// A resource manager together with the pools it owns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceManagerWithPools {
    /// The manager.
    pub resource_manager: ResourceManagerConfig,
    /// Its pools, in declared order.
    #[serde(default)]
    pub resource_pools: Vec<ResourcePoolConfig>,
}

/// Borrowed view of one manager and its pools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManagerPools<'a> {
    /// The manager.
    pub manager: &'a ResourceManagerConfig,
    /// Its pools, in declared order.
    pub pools: &'a [ResourcePoolConfig],
}

/// Every resource manager and pool of the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    /// The root manager; always set after resolution.
    #[serde(rename = "resource_manager", default, skip_serializing_if = "Option::is_none")]
    pub root_manager: Option<ResourceManagerConfig>,

    /// Pools of the root manager; never empty after resolution.
    #[serde(rename = "resource_pools", default, skip_serializing_if = "Vec::is_empty")]
    pub root_pools: Vec<ResourcePoolConfig>,

    /// Further managers, each with its own pools.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_resource_managers: Vec<ResourceManagerWithPools>,

    /// Top-level scheduler of older single-manager documents. Folded into
    /// the root manager by [`ResourceConfig::normalize`].
    #[serde(rename = "scheduler", default, skip_serializing)]
    pub legacy_scheduler: Option<SchedulerConfig>,
}

impl ResourceConfig {
    /// Flattened managers: the root manager with the root pools first, then
    /// each additional manager in declared order.
    #[must_use]
    pub fn resource_managers(&self) -> Vec<ManagerPools<'_>> {
        let root = self.root_manager.as_ref().map(|manager| ManagerPools {
            manager,
            pools: &self.root_pools,
        });
        root.into_iter()
            .chain(
                self.additional_resource_managers
                    .iter()
                    .map(|entry| ManagerPools {
                        manager: &entry.resource_manager,
                        pools: &entry.resource_pools,
                    }),
            )
            .collect()
    }

    /// Cluster names of every Kubernetes manager, in flattened order.
    #[must_use]
    pub fn kubernetes_cluster_names(&self) -> Vec<&str> {
        self.resource_managers()
            .into_iter()
            .filter_map(|entry| entry.manager.as_kubernetes())
            .map(|kubernetes| kubernetes.cluster_name.as_str())
            .collect()
    }

    /// The agent manager and its pools.
    ///
    /// Only the root manager may be agent-backed, so this is `None` whenever
    /// the root is another backend.
    #[must_use]
    pub fn agent_rm_config(&self) -> Option<ManagerPools<'_>> {
        match &self.root_manager {
            Some(manager @ ResourceManagerConfig::Agent(_)) => Some(ManagerPools {
                manager,
                pools: &self.root_pools,
            }),
            _ => None,
        }
    }

    /// Every pool of every manager, in flattened order.
    pub fn all_pools(&self) -> impl Iterator<Item = &ResourcePoolConfig> {
        self.root_pools.iter().chain(
            self.additional_resource_managers
                .iter()
                .flat_map(|entry| entry.resource_pools.iter()),
        )
    }

    /// Fold legacy single-manager fields into the canonical shape.
    ///
    /// Runs right after decoding and again at the start of resolution; it is
    /// a no-op once applied.
    ///
    /// # Errors
    ///
    /// Returns a structural error if a top-level `scheduler` is combined
    /// with a root manager that is not agent-backed or already has one.
    pub fn normalize(&mut self) -> Result<()> {
        let Some(scheduler) = self.legacy_scheduler.take() else {
            return Ok(());
        };

        match self
            .root_manager
            .get_or_insert_with(|| {
                ResourceManagerConfig::Agent(AgentResourceManagerConfig::default())
            })
        {
            ResourceManagerConfig::Agent(agent) if agent.scheduler.is_none() => {
                debug!("moving top-level scheduler into the agent resource manager");
                agent.scheduler = Some(scheduler);
                Ok(())
            }
            ResourceManagerConfig::Agent(_) => Err(ConfigError::structural(
                "scheduler is set both at the top level and under resource_manager",
            )),
            other => Err(ConfigError::structural(format!(
                "a top-level scheduler requires a resource manager of type: agent, got: {}",
                other.kind()
            ))),
        }
    }
}

/// The root of a configuration document.
///
/// Only the resource configuration is modelled, so the document decodes
/// straight into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    /// Resource managers and pools.
    pub resource_config: ResourceConfig,
}

impl Config {
    /// Decode a YAML document and normalize its shape.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown fields, unknown variant tags, malformed
    /// values, or a shape that cannot be normalized.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.resource_config.normalize()?;
        Ok(config)
    }

    /// Decode a JSON document and normalize its shape.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_yaml`].
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        config.resource_config.normalize()?;
        Ok(config)
    }

    /// Decode, resolve and validate a YAML document.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error, or [`ConfigError::Invalid`] with every
    /// violation found.
    pub fn load_yaml(yaml: &str) -> Result<Self> {
        let mut config = Self::from_yaml(yaml)?;
        config.resolve()?;
        config.validate()?;
        Ok(config)
    }

    /// Render the document as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Render the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::{DispatcherResourceManagerConfig, KubernetesResourceManagerConfig};

    fn kubernetes(cluster_name: &str) -> ResourceManagerConfig {
        ResourceManagerConfig::Kubernetes(KubernetesResourceManagerConfig {
            cluster_name: cluster_name.to_string(),
            ..KubernetesResourceManagerConfig::default()
        })
    }

    fn agent() -> ResourceManagerConfig {
        ResourceManagerConfig::Agent(AgentResourceManagerConfig::default())
    }

    fn with_pools(manager: ResourceManagerConfig, pools: &[&str]) -> ResourceManagerWithPools {
        ResourceManagerWithPools {
            resource_manager: manager,
            resource_pools: pools.iter().map(|p| ResourcePoolConfig::named(*p)).collect(),
        }
    }

    #[test]
    fn resource_managers_puts_root_first() {
        let config = ResourceConfig {
            root_manager: Some(kubernetes("")),
            root_pools: vec![ResourcePoolConfig::named("root")],
            additional_resource_managers: vec![with_pools(agent(), &["test"])],
            ..ResourceConfig::default()
        };

        let managers = config.resource_managers();
        assert_eq!(managers.len(), 2);
        assert_eq!(managers[0].manager, &kubernetes(""));
        assert_eq!(managers[0].pools, &[ResourcePoolConfig::named("root")]);
        assert_eq!(managers[1].manager, &agent());
        assert_eq!(managers[1].pools, &[ResourcePoolConfig::named("test")]);
    }

    #[test]
    fn kubernetes_cluster_names() {
        let cases = [
            (Some(agent()), vec![], Vec::<&str>::new()),
            (
                Some(ResourceManagerConfig::Dispatcher(DispatcherResourceManagerConfig::default())),
                vec![],
                vec![],
            ),
            (Some(kubernetes("test")), vec![], vec!["test"]),
            (
                Some(kubernetes("test1")),
                vec![with_pools(kubernetes("test2"), &[])],
                vec!["test1", "test2"],
            ),
            (
                Some(agent()),
                vec![with_pools(kubernetes("test1"), &[]), with_pools(kubernetes("test2"), &[])],
                vec!["test1", "test2"],
            ),
        ];

        for (root_manager, additional, expected) in cases {
            let config = ResourceConfig {
                root_manager,
                additional_resource_managers: additional,
                ..ResourceConfig::default()
            };
            assert_eq!(config.kubernetes_cluster_names(), expected);
        }
    }

    #[test]
    fn agent_rm_config_only_for_agent_root() {
        let no_agent = ResourceConfig {
            root_manager: Some(kubernetes("")),
            additional_resource_managers: vec![with_pools(kubernetes(""), &[])],
            ..ResourceConfig::default()
        };
        assert!(no_agent.agent_rm_config().is_none());

        let has_agent = ResourceConfig {
            root_manager: Some(agent()),
            additional_resource_managers: vec![with_pools(kubernetes(""), &[])],
            ..ResourceConfig::default()
        };
        assert_eq!(has_agent.agent_rm_config(), Some(has_agent.resource_managers()[0]));
    }

    #[test]
    fn all_pools_in_order() {
        let config = ResourceConfig {
            root_manager: Some(agent()),
            root_pools: vec![ResourcePoolConfig::named("a")],
            additional_resource_managers: vec![
                with_pools(kubernetes("x"), &["b", "c"]),
                with_pools(kubernetes("y"), &["d"]),
            ],
            ..ResourceConfig::default()
        };
        let names: Vec<_> = config.all_pools().map(|p| p.pool_name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
    }

    #[test]
    fn legacy_scheduler_moves_into_root_agent() {
        let config = Config::from_yaml("scheduler:\n  type: round_robin\n").unwrap();
        let agent = config
            .resource_config
            .root_manager
            .as_ref()
            .and_then(ResourceManagerConfig::as_agent);
        assert_eq!(
            agent.and_then(|a| a.scheduler.as_ref()).map(|s| s.policy.kind()),
            Some(crate::scheduler::SchedulerKind::RoundRobin)
        );
        assert!(config.resource_config.legacy_scheduler.is_none());
    }

    #[test]
    fn legacy_scheduler_conflicts_are_structural() {
        let both = Config::from_yaml(
            "scheduler:\n  type: fair_share\nresource_manager:\n  type: agent\n  scheduler:\n    type: priority\n",
        );
        assert!(matches!(both, Err(ConfigError::Structural(_))));

        let kubernetes = Config::from_yaml(
            "scheduler:\n  type: fair_share\nresource_manager:\n  type: kubernetes\n  max_slots_per_pod: 1\n",
        )
        .unwrap_err();
        assert!(kubernetes.is_fatal());
        assert!(kubernetes.to_string().ends_with("got: kubernetes"));
    }

    #[test]
    fn strict_decoding() {
        assert!(matches!(
            Config::from_yaml("resource_manager:\n  type: agent\nbogus: 1\n"),
            Err(ConfigError::Yaml(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{"resource_manager": {"type": "nomad"}}"#),
            Err(ConfigError::Json(_))
        ));
        assert_eq!(Config::from_yaml("{}").unwrap(), Config::default());
    }
}
