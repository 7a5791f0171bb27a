//! Implementation of the `check` and `resolve` commands.

use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use rmconfig_core::Config;
use tracing::{debug, info};

/// Serialization used by `resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML document.
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

/// Read, decode and resolve the document at `path`, then validate it.
///
/// Files ending in `.json` are decoded as JSON, everything else as YAML.
fn load(path: &Path) -> anyhow::Result<Config> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    debug!(path = %path.display(), bytes = raw.len(), "loaded configuration");

    let mut config = if path.extension().is_some_and(|ext| ext == "json") {
        Config::from_json(&raw)?
    } else {
        Config::from_yaml(&raw)?
    };
    config.resolve()?;
    config.validate()?;
    Ok(config)
}

/// Validate the document and summarize it.
pub fn check(path: &Path) -> anyhow::Result<String> {
    let config = load(path)?;
    let resources = &config.resource_config;
    let managers = resources.resource_managers().len();
    let pools = resources.all_pools().count();
    info!(managers, pools, "configuration is valid");
    Ok(format!(
        "{}: ok ({managers} resource managers, {pools} resource pools)",
        path.display()
    ))
}

/// Render the validated document with every default filled in.
pub fn resolve(path: &Path, format: OutputFormat) -> anyhow::Result<String> {
    let config = load(path)?;
    let rendered = match format {
        OutputFormat::Yaml => config.to_yaml()?,
        OutputFormat::Json => config.to_json()?,
    };
    Ok(rendered)
}
