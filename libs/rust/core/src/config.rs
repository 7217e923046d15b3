//! Layered service configuration.
//!
//! Sources, lowest precedence first: per-service defaults, the file named by
//! `CAPSTONE_CONFIG_FILE` (format by extension), then `CAPSTONE__*`
//! environment variables with `__` separating nested keys, for example
//! `CAPSTONE__ARTIFACTS__MODEL=/srv/models/ridge.json`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::artifact::ArtifactLocations;

pub const CONFIG_FILE_ENV: &str = "CAPSTONE_CONFIG_FILE";
const ENV_PREFIX: &str = "CAPSTONE";

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    pub bind: String,
    pub http_port: u16,
    pub artifacts: ArtifactLocations,
}

impl ServiceConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind, self.http_port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.bind, self.http_port))
    }
}

/// Built-in values a service starts from before any file or env override.
#[derive(Debug, Clone)]
pub struct ServiceDefaults {
    pub http_port: u16,
    pub artifacts: ArtifactLocations,
}

pub fn load_config(service: &str, defaults: &ServiceDefaults) -> Result<ServiceConfig> {
    let file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);
    load_config_from(service, defaults, file.as_deref())
}

pub fn load_config_from(service: &str, defaults: &ServiceDefaults, file: Option<&Path>) -> Result<ServiceConfig> {
    let mut builder = config::Config::builder()
        .set_default("service_name", service)?
        .set_default("bind", "0.0.0.0")?
        .set_default("http_port", i64::from(defaults.http_port))?
        .set_default("artifacts.model", path_str(&defaults.artifacts.model))?;
    if let Some(transform) = &defaults.artifacts.transform {
        builder = builder.set_default("artifacts.transform", path_str(transform))?;
    }
    if let Some(metadata) = &defaults.artifacts.metadata {
        builder = builder.set_default("artifacts.metadata", path_str(metadata))?;
    }
    if let Some(path) = file {
        builder = builder.add_source(config::File::from(path).required(true));
    }
    builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"));

    let cfg = builder.build().context("building configuration")?;
    cfg.try_deserialize().context("deserializing service configuration")
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
