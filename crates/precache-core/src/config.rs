use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::resolver::{RegistryEndpoints, REFERENCE_LOCALE};

/// Global configuration loaded from `~/.config/wp-precache/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecacheConfig {
    /// Base URL of the registry metadata API.
    pub api_base: String,
    /// Scheme for core release downloads ("https").
    pub download_scheme: String,
    /// Host serving core release archives.
    pub download_host: String,
    /// Locale used for `core` when `--locale` is not given.
    pub default_locale: String,
    /// Timeout for metadata requests and HEAD probes.
    pub metadata_timeout_secs: u64,
    /// Timeout for a whole artifact transfer.
    pub download_timeout_secs: u64,
    /// Theme/plugin slugs processed concurrently when `--jobs` is not given.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Cache root; `WP_CLI_CACHE_DIR` still wins when set.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Directory for in-flight downloads (None = system temp dir).
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

fn default_jobs() -> usize {
    1
}

impl Default for PrecacheConfig {
    fn default() -> Self {
        let endpoints = RegistryEndpoints::default();
        Self {
            api_base: endpoints.api_base,
            download_scheme: endpoints.download_scheme,
            download_host: endpoints.download_host,
            default_locale: REFERENCE_LOCALE.to_string(),
            metadata_timeout_secs: 30,
            download_timeout_secs: 600,
            jobs: default_jobs(),
            cache_dir: None,
            scratch_dir: None,
        }
    }
}

impl PrecacheConfig {
    pub fn endpoints(&self) -> RegistryEndpoints {
        RegistryEndpoints {
            api_base: self.api_base.clone(),
            download_scheme: self.download_scheme.clone(),
            download_host: self.download_host.clone(),
        }
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Scratch directory for temp downloads.
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("wp-precache"))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("wp-precache")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PrecacheConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PrecacheConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PrecacheConfig = toml::from_str(&data)?;
    Ok(cfg)
}
