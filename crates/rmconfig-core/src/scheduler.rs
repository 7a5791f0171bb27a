//! Scheduler policy configuration.
//!
//! The scheduling algorithms live elsewhere; this module only carries the
//! policy a resource manager or pool selects and its parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Priority assigned to jobs that do not request one.
pub const DEFAULT_SCHEDULING_PRIORITY: i32 = 42;

/// Lowest priority an operator may configure.
pub const MIN_SCHEDULING_PRIORITY: i32 = 1;

/// Highest priority an operator may configure.
pub const MAX_SCHEDULING_PRIORITY: i32 = 99;

/// Bin-packing strategy used to place a job's resource request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FittingPolicy {
    /// Pack onto the fullest agent that still fits.
    #[default]
    Best,
    /// Spread onto the emptiest agent.
    Worst,
}

/// Parameters of the priority policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityParams {
    /// Whether higher-priority jobs may preempt running ones.
    pub preemption: bool,
    /// Priority for jobs that do not set one.
    pub default_priority: i32,
}

impl Default for PriorityParams {
    fn default() -> Self {
        Self {
            preemption: false,
            default_priority: DEFAULT_SCHEDULING_PRIORITY,
        }
    }
}

/// The scheduling algorithm selected for a manager or pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingPolicy {
    /// Fair-share between active jobs.
    FairShare,
    /// Strict priority ordering.
    Priority(PriorityParams),
    /// Round-robin between jobs.
    RoundRobin,
}

impl SchedulingPolicy {
    /// The kind of policy, without its parameters.
    #[must_use]
    pub const fn kind(&self) -> SchedulerKind {
        match self {
            Self::FairShare => SchedulerKind::FairShare,
            Self::Priority(_) => SchedulerKind::Priority,
            Self::RoundRobin => SchedulerKind::RoundRobin,
        }
    }
}

/// Discriminator of [`SchedulingPolicy`] as written in documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    /// `fair_share`
    FairShare,
    /// `priority`
    Priority,
    /// `round_robin`
    RoundRobin,
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FairShare => "fair_share",
            Self::Priority => "priority",
            Self::RoundRobin => "round_robin",
        })
    }
}

/// Scheduler configuration of a resource manager or pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchedulerSpec", into = "SchedulerSpec")]
pub struct SchedulerConfig {
    /// Selected algorithm and its parameters.
    pub policy: SchedulingPolicy,
    /// Bin-packing strategy.
    pub fitting_policy: FittingPolicy,
    /// Whether a job may be split across agents of different sizes.
    pub allow_heterogeneous_fits: bool,
}

impl SchedulerConfig {
    /// The platform default: priority scheduling with best fit.
    #[must_use]
    pub fn platform_default() -> Self {
        Self::new(SchedulingPolicy::Priority(PriorityParams::default()))
    }

    /// A scheduler with the given policy and default fitting.
    #[must_use]
    pub fn new(policy: SchedulingPolicy) -> Self {
        Self {
            policy,
            fitting_policy: FittingPolicy::default(),
            allow_heterogeneous_fits: false,
        }
    }

    /// Set the fitting policy.
    #[must_use]
    pub const fn with_fitting_policy(mut self, fitting_policy: FittingPolicy) -> Self {
        self.fitting_policy = fitting_policy;
        self
    }

    /// The priority parameters, if this is a priority scheduler.
    #[must_use]
    pub const fn priority(&self) -> Option<&PriorityParams> {
        match &self.policy {
            SchedulingPolicy::Priority(params) => Some(params),
            SchedulingPolicy::FairShare | SchedulingPolicy::RoundRobin => None,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::platform_default()
    }
}

/// Wire form of [`SchedulerConfig`]: one flat block with a `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchedulerSpec {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<SchedulerKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fitting_policy: Option<FittingPolicy>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    allow_heterogeneous_fits: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    preemption: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_priority: Option<i32>,
}

impl TryFrom<SchedulerSpec> for SchedulerConfig {
    type Error = ConfigError;

    fn try_from(spec: SchedulerSpec) -> Result<Self, Self::Error> {
        let kind = spec.kind.unwrap_or(SchedulerKind::Priority);
        let policy = match kind {
            SchedulerKind::Priority => {
                let defaults = PriorityParams::default();
                SchedulingPolicy::Priority(PriorityParams {
                    preemption: spec.preemption.unwrap_or(defaults.preemption),
                    default_priority: spec.default_priority.unwrap_or(defaults.default_priority),
                })
            }
            SchedulerKind::FairShare | SchedulerKind::RoundRobin => {
                if spec.preemption.is_some() || spec.default_priority.is_some() {
                    return Err(ConfigError::structural(format!(
                        "scheduler of type {kind} does not accept preemption or default_priority"
                    )));
                }
                if kind == SchedulerKind::FairShare {
                    SchedulingPolicy::FairShare
                } else {
                    SchedulingPolicy::RoundRobin
                }
            }
        };

        Ok(Self {
            policy,
            fitting_policy: spec.fitting_policy.unwrap_or_default(),
            allow_heterogeneous_fits: spec.allow_heterogeneous_fits,
        })
    }
}

impl From<SchedulerConfig> for SchedulerSpec {
    fn from(config: SchedulerConfig) -> Self {
        let (preemption, default_priority) = match config.policy {
            SchedulingPolicy::Priority(params) => {
                (Some(params.preemption), Some(params.default_priority))
            }
            SchedulingPolicy::FairShare | SchedulingPolicy::RoundRobin => (None, None),
        };
        Self {
            kind: Some(config.policy.kind()),
            fitting_policy: Some(config.fitting_policy),
            allow_heterogeneous_fits: config.allow_heterogeneous_fits,
            preemption,
            default_priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(yaml: &str) -> Result<SchedulerConfig, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    #[test]
    fn platform_default_is_priority_best_fit() {
        let config = SchedulerConfig::platform_default();
        assert_eq!(config.fitting_policy, FittingPolicy::Best);
        assert_eq!(
            config.priority(),
            Some(&PriorityParams {
                preemption: false,
                default_priority: DEFAULT_SCHEDULING_PRIORITY,
            })
        );
    }

    #[test]
    fn decodes_each_kind() {
        assert_eq!(decode("type: fair_share").unwrap().policy, SchedulingPolicy::FairShare);
        assert_eq!(decode("type: round_robin").unwrap().policy, SchedulingPolicy::RoundRobin);

        let priority = decode("type: priority\npreemption: true\ndefault_priority: 10").unwrap();
        assert_eq!(
            priority.policy,
            SchedulingPolicy::Priority(PriorityParams {
                preemption: true,
                default_priority: 10,
            })
        );
    }

    #[test]
    fn missing_type_means_priority() {
        let config = decode("fitting_policy: worst").unwrap();
        assert_eq!(config.policy.kind(), SchedulerKind::Priority);
        assert_eq!(config.fitting_policy, FittingPolicy::Worst);
    }

    #[test]
    fn rejects_foreign_parameters() {
        assert!(decode("type: fair_share\npreemption: true").is_err());
        assert!(decode("type: round_robin\ndefault_priority: 3").is_err());
    }

    #[test]
    fn rejects_unknown_kind_and_fields() {
        assert!(decode("type: lottery").is_err());
        assert!(decode("type: priority\nweights: 3").is_err());
    }

    #[test]
    fn serializes_back_to_flat_block() {
        let yaml =
            serde_yaml::to_string(&SchedulerConfig::new(SchedulingPolicy::FairShare)).unwrap();
        assert!(yaml.contains("type: fair_share"));
        assert!(yaml.contains("fitting_policy: best"));
        assert!(!yaml.contains("preemption"));
        assert_eq!(decode(&yaml).unwrap().policy, SchedulingPolicy::FairShare);
    }
}
