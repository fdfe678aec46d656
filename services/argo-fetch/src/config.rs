//! Configuration file for the fetch tool.
//!
//! Everything is optional: a missing file yields the defaults, and
//! command-line flags (or their environment variables) override whatever
//! the file says.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use argo_common::DatasetKind;
use argovis_client::{ClientConfig, DEFAULT_BASE_URL};
use gdac_local::LocalFtpOptions;
use serde::Deserialize;
use tracing::debug;

/// Root of `argo-fetch.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub local: LocalConfig,
}

/// Argovis API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Local GDAC mirror settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalConfig {
    /// Mirror root holding the `<dac>/` folders
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub dataset: DatasetKind,
    /// Load floats on a rayon pool
    #[serde(default)]
    pub parallel: bool,
    /// Pool size; the global pool when unset
    #[serde(default)]
    pub threads: Option<usize>,
}

impl AppConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = &self.remote.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("remote.base_url must be an http(s) URL, got '{}'", url);
        }
        if self.remote.timeout_secs == 0 {
            bail!("remote.timeout_secs must be positive");
        }
        if self.local.threads == Some(0) {
            bail!("local.threads must be positive");
        }
        Ok(())
    }

    /// Apply command-line overrides on top of the file values.
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        ftp_root: Option<PathBuf>,
        cache_dir: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(url) = base_url {
            self.remote.base_url = url;
        }
        if let Some(root) = ftp_root {
            self.local.root = Some(root);
        }
        if let Some(dir) = cache_dir {
            self.local.cache_dir = Some(dir);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.remote.base_url.clone(),
            timeout: Duration::from_secs(self.remote.timeout_secs),
            connect_timeout: Duration::from_secs(self.remote.connect_timeout_secs),
        }
    }

    /// Mirror options; requires a root from the file, `--ftp-root` or
    /// `ARGO_FTP_ROOT`.
    pub fn local_options(&self, dataset: Option<DatasetKind>) -> Result<LocalFtpOptions> {
        let Some(root) = &self.local.root else {
            bail!("no local GDAC root configured (set local.root, --ftp-root or ARGO_FTP_ROOT)");
        };
        let mut options =
            LocalFtpOptions::new(root).with_dataset(dataset.unwrap_or(self.local.dataset));
        if let Some(dir) = &self.local.cache_dir {
            options = options.with_cache_dir(dir);
        }
        Ok(options)
    }
}
