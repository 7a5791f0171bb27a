//! Validation of resolved documents.
//!
//! Per-field rules are scoped to the node type they check. The rules that
//! span the whole configuration (name uniqueness, the shape of additional
//! managers) are registered twice: once on [`ResourceConfig`] and once on
//! the document root [`Config`]. A single violation of one of them
//! therefore shows up as two entries, one at `root.resource_config` and one
//! at `root`; callers and operators rely on those counts.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::OnceLock;

use rmconfig_check::{
    collect, greater_than, greater_than_or_equal_to, is_in, less_than_or_equal_to, not_empty,
    CheckError, Registry, Report, Segment, Walk,
};
use tracing::warn;

use crate::manager::{
    AgentResourceManagerConfig, DispatcherResourceManagerConfig, InternalTaskGatewayConfig,
    KubernetesResourceManagerConfig, ManagerKind, ResourceManagerConfig, SlotType,
    DEFAULT_CLUSTER_NAME,
};
use crate::pool::{ResourcePoolConfig, UNLIMITED_CPU_CONTAINERS};
use crate::resource_config::{Config, ResourceConfig, ResourceManagerWithPools};
use crate::scheduler::{SchedulerConfig, MAX_SCHEDULING_PRIORITY, MIN_SCHEDULING_PRIORITY};

/// The rule set every document is validated against.
///
/// Built on first use and shared read-only afterwards.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(build_registry)
}

fn build_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register(|config: &Config| resource_config_rules(&config.resource_config))
        .register(resource_config_rules)
        .register(kubernetes_rules)
        .register(gateway_rules)
        .register(dispatcher_rules)
        .register(pool_rules)
        .register(scheduler_rules);
    registry
}

impl Config {
    /// Check a resolved document against every rule.
    ///
    /// # Errors
    ///
    /// Returns a report with every violation, in walk order.
    pub fn validate(&self) -> Result<(), Report> {
        registry().validate(self).inspect_err(|report| {
            warn!(violations = report.len(), "resource configuration is invalid");
        })
    }
}

// ============================================================================
// Cross-cutting rules
// ============================================================================

fn resource_config_rules(config: &ResourceConfig) -> Vec<CheckError> {
    let mut errors = Vec::new();
    let mut manager_names = HashSet::new();
    // pool name -> index of the manager that declared it first
    let mut pool_owners: HashMap<&str, usize> = HashMap::new();

    let root = config.root_manager.as_ref().map(|manager| {
        let name = match manager.name() {
            "" => DEFAULT_CLUSTER_NAME,
            name => name,
        };
        (Some(name), &config.root_pools)
    });
    let root_pools_only = (config.root_manager.is_none()).then_some((None, &config.root_pools));
    let additional = config
        .additional_resource_managers
        .iter()
        .map(|entry| (Some(entry.resource_manager.name()), &entry.resource_pools));

    for (owner, (manager_name, pools)) in root
        .into_iter()
        .chain(root_pools_only)
        .chain(additional)
        .enumerate()
    {
        if owner > 0 {
            let entry = &config.additional_resource_managers[owner - 1];
            errors.extend(additional_manager_rules(entry));
        }

        if let Some(name) = manager_name {
            if !manager_names.insert(name) {
                errors.push(CheckError::new(format!(
                    "resource manager has a duplicate name: {name}"
                )));
            }
        }

        for pool in pools {
            let name = pool.pool_name.as_str();
            match pool_owners.get(name).copied() {
                None => {
                    pool_owners.insert(name, owner);
                }
                Some(first) if first == owner => {
                    errors.push(CheckError::new(format!(
                        "resource pool has a duplicate name: {name}"
                    )));
                }
                Some(_) => {
                    errors.push(CheckError::new(format!(
                        "resource pool has a duplicate name: {name} \
                         They must be unique across even different resource managers"
                    )));
                }
            }
        }
    }

    errors
}

fn additional_manager_rules(entry: &ResourceManagerWithPools) -> Vec<CheckError> {
    let mut errors = Vec::new();
    if entry.resource_manager.kind() != ManagerKind::Kubernetes {
        errors.push(CheckError::new(
            "additional_resource_managers only supports resource managers of type: kubernetes",
        ));
    }
    if entry.resource_pools.is_empty() {
        errors.push(CheckError::new(
            "for additional_resource_managers, you must specify at least one resource pool",
        ));
    }
    errors
}

// ============================================================================
// Per-node rules
// ============================================================================

fn kubernetes_rules(config: &KubernetesResourceManagerConfig) -> Vec<CheckError> {
    let slot_type = match config.slot_type {
        Some(SlotType::Rocm) => Err(CheckError::new(
            "rocm slot_type is not supported yet on k8s",
        )),
        Some(SlotType::Cuda | SlotType::Cpu) | None => Ok(()),
    };
    let cpu_request = config.slot_resource_requests.cpu.map_or(Ok(()), |cpu| {
        greater_than(cpu, 0.0, "slot_resource_requests.cpu must be > 0")
    });
    let max_slots = config.max_slots_per_pod.map_or_else(
        || Err(CheckError::new("max_slots_per_pod must be provided")),
        |slots| greater_than_or_equal_to(slots, 0, "max_slots_per_pod must be >= 0"),
    );

    collect([
        slot_type,
        cpu_request,
        not_empty(&config.cluster_name, "cluster_name is required"),
        max_slots,
    ])
}

fn gateway_rules(config: &InternalTaskGatewayConfig) -> Vec<CheckError> {
    let ip = if config.gateway_ip.is_empty() || config.gateway_ip.parse::<IpAddr>().is_ok() {
        Ok(())
    } else {
        Err(CheckError::new(format!(
            "invalid gateway_ip: {} is not an IP address",
            config.gateway_ip
        )))
    };
    let port_range = match (config.gateway_port_range_start, config.gateway_port_range_end) {
        (Some(start), Some(end)) => less_than_or_equal_to(
            start,
            end,
            "gateway_port_range_start must be <= gateway_port_range_end",
        ),
        _ => Ok(()),
    };

    collect([
        not_empty(&config.gateway_name, "invalid gateway_name"),
        not_empty(&config.gateway_namespace, "invalid gateway_namespace"),
        not_empty(&config.gateway_ip, "invalid gateway_ip"),
        ip,
        port_range,
    ])
}

fn dispatcher_rules(config: &DispatcherResourceManagerConfig) -> Vec<CheckError> {
    collect([is_in(
        &config.launcher_protocol,
        &["http", "https"],
        "launcher_protocol must be http or https",
    )])
}

fn pool_rules(pool: &ResourcePoolConfig) -> Vec<CheckError> {
    let max_cpu = pool.max_cpu_containers_per_agent.map_or(Ok(()), |max| {
        greater_than_or_equal_to(
            max,
            UNLIMITED_CPU_CONTAINERS,
            "max_cpu_containers_per_agent must be >= -1",
        )
    });
    collect([not_empty(&pool.pool_name, "pool_name is required"), max_cpu])
}

fn scheduler_rules(scheduler: &SchedulerConfig) -> Vec<CheckError> {
    let Some(priority) = scheduler.priority() else {
        return Vec::new();
    };
    collect([
        greater_than_or_equal_to(
            priority.default_priority,
            MIN_SCHEDULING_PRIORITY,
            "default_priority must be at least 1",
        ),
        less_than_or_equal_to(
            priority.default_priority,
            MAX_SCHEDULING_PRIORITY,
            "default_priority must be at most 99",
        ),
    ])
}

// ============================================================================
// Tree structure
// ============================================================================

impl Walk for Config {
    fn walk_children<'a>(&'a self, visit: &mut dyn FnMut(Segment, &'a dyn Walk)) {
        visit(Segment::Field("resource_config"), &self.resource_config);
    }
}

impl Walk for ResourceConfig {
    fn walk_children<'a>(&'a self, visit: &mut dyn FnMut(Segment, &'a dyn Walk)) {
        if let Some(manager) = &self.root_manager {
            visit(Segment::Field("resource_manager"), manager);
        }
        for (i, pool) in self.root_pools.iter().enumerate() {
            visit(Segment::Element("resource_pools", i), pool);
        }
        for (i, entry) in self.additional_resource_managers.iter().enumerate() {
            visit(Segment::Element("additional_resource_managers", i), entry);
        }
    }
}

impl Walk for ResourceManagerWithPools {
    fn walk_children<'a>(&'a self, visit: &mut dyn FnMut(Segment, &'a dyn Walk)) {
        visit(Segment::Field("resource_manager"), &self.resource_manager);
        for (i, pool) in self.resource_pools.iter().enumerate() {
            visit(Segment::Element("resource_pools", i), pool);
        }
    }
}

impl Walk for ResourceManagerConfig {
    fn walk_children<'a>(&'a self, visit: &mut dyn FnMut(Segment, &'a dyn Walk)) {
        let segment = Segment::Field(self.kind().as_str());
        match self {
            Self::Agent(agent) => visit(segment, agent),
            Self::Kubernetes(kubernetes) => visit(segment, kubernetes),
            Self::Dispatcher(dispatcher) => visit(segment, dispatcher),
        }
    }
}

impl Walk for AgentResourceManagerConfig {
    fn walk_children<'a>(&'a self, visit: &mut dyn FnMut(Segment, &'a dyn Walk)) {
        if let Some(scheduler) = &self.scheduler {
            visit(Segment::Field("scheduler"), scheduler);
        }
    }
}

impl Walk for KubernetesResourceManagerConfig {
    fn walk_children<'a>(&'a self, visit: &mut dyn FnMut(Segment, &'a dyn Walk)) {
        if let Some(gateway) = &self.internal_task_gateway {
            visit(Segment::Field("internal_task_gateway"), gateway);
        }
    }
}

impl Walk for ResourcePoolConfig {
    fn walk_children<'a>(&'a self, visit: &mut dyn FnMut(Segment, &'a dyn Walk)) {
        if let Some(scheduler) = &self.scheduler {
            visit(Segment::Field("scheduler"), scheduler);
        }
    }
}

impl Walk for DispatcherResourceManagerConfig {}

impl Walk for InternalTaskGatewayConfig {}

impl Walk for SchedulerConfig {}
