//! Service configuration loaded with figment.
//!
//! Sources in precedence order (later wins):
//! 1. Built-in defaults
//! 2. `leadpipe.toml`, `leadpipe.yaml`, `leadpipe.json` in the config directory
//! 3. `LEADPIPE_*` environment variables

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use leadpipe_fields::{AliasPolicy, SystemFieldCatalog};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Base name of the configuration files.
pub const CONFIG_FILE_STEM: &str = "leadpipe";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "LEADPIPE_";

/// What a settings write does when another write to the same campaign is
/// in flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
    /// Wait for the earlier write, then compute from its result
    #[default]
    Queue,
    /// Fail immediately with `LockBusy`
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LeadpipeConfig {
    /// Root of the file store
    pub data_dir: PathBuf,
    pub write_policy: WritePolicy,
    /// Upper bound on waiting for a queued write; unbounded when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_timeout_ms: Option<u64>,
    pub alias_policy: AliasPolicy,
    /// Activity log entries kept in memory
    pub activity_limit: usize,
    /// YAML file replacing the built-in system field catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_fields_path: Option<PathBuf>,
}

impl Default for LeadpipeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".leadpipe"),
            write_policy: WritePolicy::Queue,
            lock_timeout_ms: None,
            alias_policy: AliasPolicy::Reject,
            activity_limit: 200,
            system_fields_path: None,
        }
    }
}

impl LeadpipeConfig {
    /// Load configuration from the current directory and environment.
    pub fn load() -> Result<Self> {
        let dir = std::env::current_dir()?;
        Self::load_from(&dir)
    }

    /// Load configuration with files discovered in `dir`.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let config: Self = Self::figment(dir).extract()?;
        debug!(?config, "loaded configuration");
        Ok(config)
    }

    /// Load configuration from one explicit file plus the environment.
    pub fn load_file(path: &Path) -> Result<Self> {
        let file = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Figment::from(Yaml::file(path)),
            Some("json") => Figment::from(Json::file(path)),
            _ => Figment::from(Toml::file(path)),
        };
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(file)
            .merge(env_provider())
            .extract()?;
        Ok(config)
    }

    /// The merged figment, exposed so callers can layer more providers.
    pub fn figment(dir: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(dir.join(format!("{CONFIG_FILE_STEM}.toml"))))
            .merge(Yaml::file(dir.join(format!("{CONFIG_FILE_STEM}.yaml"))))
            .merge(Json::file(dir.join(format!("{CONFIG_FILE_STEM}.json"))))
            .merge(env_provider())
    }

    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }

    /// The system field catalog this configuration selects.
    pub fn system_catalog(&self) -> Result<SystemFieldCatalog> {
        match &self.system_fields_path {
            Some(path) => Ok(SystemFieldCatalog::load(path)?),
            None => Ok(SystemFieldCatalog::builtin().clone()),
        }
    }
}

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into())
}
