//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.pdu-extract.toml` files, and resolving the configured paths
//! into the concrete plan for a run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".pdu-extract.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input and output paths.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Label module settings.
    #[serde(default)]
    pub labels: LabelsConfig,

    /// C++ header settings.
    #[serde(default)]
    pub header: HeaderConfig,
}

/// Input and output paths, relative to the base directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Configuration (CFG) document.
    #[serde(default = "default_cfg")]
    pub cfg: PathBuf,

    /// Label (LBL) document.
    #[serde(default = "default_lbl")]
    pub lbl: PathBuf,

    /// Register summary output.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cfg: default_cfg(),
            lbl: default_lbl(),
            output: default_output(),
        }
    }
}

fn default_cfg() -> PathBuf {
    PathBuf::from("../dominus/CFG-WFC01_IM_MBUS.json")
}

fn default_lbl() -> PathBuf {
    PathBuf::from("../dominus/LBL-WFC01_IM_MBUS.json")
}

fn default_output() -> PathBuf {
    PathBuf::from("immergas_registers.json")
}

/// Label module generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsConfig {
    /// Generate labels_<lang>.py modules.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Output directory for the modules.
    #[serde(default = "default_labels_dir")]
    pub dir: PathBuf,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_labels_dir(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_labels_dir() -> PathBuf {
    PathBuf::from("components/immergas_modbus/immergas")
}

/// C++ PDU map header settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderConfig {
    /// Write the header after the summary.
    #[serde(default)]
    pub enabled: bool,

    /// Header output path.
    #[serde(default = "default_header_path")]
    pub path: PathBuf,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_header_path(),
        }
    }
}

fn default_header_path() -> PathBuf {
    PathBuf::from("components/immergas_modbus/immergas_pdus.h")
}

/// Concrete paths for one run, resolved against the base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub cfg: PathBuf,
    pub lbl: PathBuf,
    pub output: PathBuf,
    /// None when label generation is disabled.
    pub labels_dir: Option<PathBuf>,
    /// None when header generation is disabled.
    pub header: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref cfg) = args.cfg {
            self.paths.cfg = cfg.clone();
        }
        if let Some(ref lbl) = args.lbl {
            self.paths.lbl = lbl.clone();
        }
        if let Some(ref output) = args.output {
            self.paths.output = output.clone();
        }

        if args.no_labels {
            self.labels.enabled = false;
        }
        if let Some(ref dir) = args.labels_dir {
            self.labels.enabled = true;
            self.labels.dir = dir.clone();
        }

        // --header enables the header; a value also replaces the path
        if let Some(ref header) = args.header {
            self.header.enabled = true;
            if let Some(path) = header {
                self.header.path = path.clone();
            }
        }
    }

    /// Resolve the configured paths against a base directory.
    ///
    /// Absolute paths are kept as they are.
    pub fn plan(&self, base: &Path) -> RunPlan {
        RunPlan {
            cfg: base.join(&self.paths.cfg),
            lbl: base.join(&self.paths.lbl),
            output: base.join(&self.paths.output),
            labels_dir: self.labels.enabled.then(|| base.join(&self.labels.dir)),
            header: self.header.enabled.then(|| base.join(&self.header.path)),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
