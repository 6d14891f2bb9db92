//! Configuration file model and config path resolution
//!
//! Every value in the TOML file is optional. The service crate layers
//! command-line flags and environment variables on top and applies
//! compiled defaults last.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "RACKFLOW_CONFIG";

/// Logging section of the TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset (e.g. "info", "rackflow_ingest=debug")
    pub level: Option<String>,
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Work-order (installation) service GraphQL endpoint
    pub work_order_url: Option<String>,
    /// Rack-inventory service base URL; the asset id is appended
    pub inventory_url: Option<String>,
    /// Raw `Cookie` header sent to the work-order service
    pub work_order_cookie: Option<String>,
    /// Raw `Cookie` header sent to the inventory service
    pub inventory_cookie: Option<String>,
    /// Per-request HTTP timeout
    pub request_timeout_secs: Option<u64>,
    /// Fetch-phase worker count
    pub concurrency: Option<usize>,
    /// Pause between record writes
    pub row_delay_ms: Option<u64>,
    /// Upper bound for writing one record
    pub write_timeout_secs: Option<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Field name → option labels the downstream tracker offers
    #[serde(default)]
    pub options: BTreeMap<String, Vec<String>>,
}

/// Resolve which config file to read.
///
/// Priority order:
/// 1. Command-line argument
/// 2. `RACKFLOW_CONFIG` environment variable
/// 3. `<platform config dir>/rackflow/config.toml`
///
/// Returns `None` when no candidate can be determined.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path()
}

/// Platform default location of the config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rackflow").join("config.toml"))
}

/// Load a TOML config file.
///
/// A missing file is not an error: a warning is logged and an empty
/// config returned so compiled defaults apply. A file that exists but
/// cannot be read or parsed is an error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    debug!(path = %path.display(), "Loaded config file");

    validate(&config)?;
    Ok(config)
}

/// Reject values that can never be valid, whatever the other tiers say
fn validate(config: &TomlConfig) -> Result<()> {
    if config.concurrency == Some(0) {
        return Err(Error::Config("concurrency must be at least 1".to_string()));
    }

    for (field, labels) in &config.options {
        if field.trim().is_empty() {
            return Err(Error::Config("options table contains an empty field name".to_string()));
        }
        if labels.iter().any(|l| l.trim().is_empty()) {
            return Err(Error::Config(format!(
                "options for field \"{}\" contain an empty label",
                field
            )));
        }
    }

    Ok(())
}
