//! Settings resolution: defaults, then the config file, then environment
//! and flags.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use vendorboard_client::ClientConfig;
use vendorboard_progress::ProgressWeighting;

/// Optional JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub user: Option<String>,
    pub timeout_secs: Option<u64>,
    pub analyze_timeout_secs: Option<u64>,
    pub weighting: Option<ProgressWeighting>,
}

impl FileConfig {
    /// Read and parse `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub user: Option<String>,
    pub weighting: Option<ProgressWeighting>,
}

/// Effective settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client: ClientConfig,
    pub token: Option<String>,
    pub user: String,
    pub weighting: ProgressWeighting,
}

impl Settings {
    /// Layer `overrides` over `file` over the defaults.
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Self {
        let mut client = ClientConfig::default();
        if let Some(url) = overrides.api_url.or(file.api_url) {
            client.base_url = url;
        }
        if let Some(secs) = file.timeout_secs {
            client.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.analyze_timeout_secs {
            client.analyze_timeout = Duration::from_secs(secs);
        }

        Self {
            client,
            token: overrides.token.or(file.token).filter(|t| !t.trim().is_empty()),
            user: overrides.user.or(file.user).unwrap_or_else(|| "cli".to_string()),
            weighting: overrides.weighting.or(file.weighting).unwrap_or_default(),
        }
    }
}
