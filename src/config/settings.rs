//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and data.

use crate::error::{ConfigError, ConfigResult};
use crate::instrument::{ConfirmPolicy, ExchangeSettings};
use crate::manifest::default_manifest_path;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/psu-remote)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/psu-remote)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Resolve platform directories, creating them if needed.
    pub fn resolve() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "psu-remote", "psu-remote").ok_or(ConfigError::DirectoryNotFound)?;

        let paths = Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        };

        fs::create_dir_all(&paths.config_dir)?;
        fs::create_dir_all(&paths.data_dir)?;

        Ok(paths)
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the path to the exchange history directory.
    pub fn history_dir(&self) -> PathBuf {
        self.data_dir.join("history")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Line speed of the instrument.
    pub baud_rate: u32,
    /// Timeout of the reachability probe in milliseconds.
    pub probe_timeout_ms: u64,
    /// How long to wait for the query response, in milliseconds.
    pub read_timeout_ms: u64,
    /// Prefix for bare port numbers (`COM` + `3`).
    pub port_prefix: String,
    /// Accepted absolute difference when confirming; `None` means the
    /// reading must equal the commanded value exactly.
    pub confirm_tolerance: Option<f64>,
    /// Executable the build manifest is checked against. Defaults to the
    /// running executable.
    pub artifact_path: Option<PathBuf>,
    /// Build manifest location. Defaults to next to the artifact.
    pub manifest_path: Option<PathBuf>,
    /// Record every `send` in the exchange history.
    pub save_history: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            probe_timeout_ms: 0,
            read_timeout_ms: 3000,
            port_prefix: default_port_prefix().to_string(),
            confirm_tolerance: None,
            artifact_path: None,
            manifest_path: None,
            save_history: true,
        }
    }
}

fn default_port_prefix() -> &'static str {
    if cfg!(windows) {
        "COM"
    } else {
        "/dev/ttyUSB"
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults if absent.
    pub fn load(paths: &Paths) -> ConfigResult<Self> {
        let file = paths.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.baud_rate == 0 {
            return Err(ConfigError::InvalidFormat("baud_rate must be positive".to_string()));
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::InvalidFormat(
                "read_timeout_ms must be positive".to_string(),
            ));
        }
        if let Some(tolerance) = self.confirm_tolerance {
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(ConfigError::InvalidFormat(format!(
                    "confirm_tolerance must be a non-negative number, got {}",
                    tolerance
                )));
            }
        }
        Ok(())
    }

    /// Line parameters for the transport.
    pub fn exchange_settings(&self) -> ExchangeSettings {
        ExchangeSettings {
            baud_rate: self.baud_rate,
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            confirm: match self.confirm_tolerance {
                Some(tolerance) => ConfirmPolicy::Tolerance(tolerance),
                None => ConfirmPolicy::Exact,
            },
        }
    }

    /// Executable to stamp: the configured artifact, else the running
    /// executable.
    pub fn artifact(&self) -> Option<PathBuf> {
        self.artifact_path
            .clone()
            .or_else(|| std::env::current_exe().ok())
    }

    /// Packaged executable to check the manifest against.
    ///
    /// Without a configured path, the running executable only counts as
    /// packaged when a manifest is configured or sits beside it. Running
    /// from a build tree or a bare install therefore has no artifact.
    pub fn packaged_artifact(&self) -> Option<PathBuf> {
        if let Some(path) = &self.artifact_path {
            return Some(path.clone());
        }

        let exe = std::env::current_exe().ok()?;
        if self.manifest_path.is_some() || self.manifest_for(&exe).is_file() {
            Some(exe)
        } else {
            None
        }
    }

    /// Manifest location for `artifact`.
    pub fn manifest_for(&self, artifact: &Path) -> PathBuf {
        self.manifest_path
            .clone()
            .unwrap_or_else(|| default_manifest_path(artifact))
    }
}
