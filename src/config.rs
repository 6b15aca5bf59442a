use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use midi_to_tab::CellLayout;
use serde::{Deserialize, Serialize};
use sheet_to_midi::{DetectorOptions, RegionOrder};
use thiserror::Error;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Knobs of the image to tab conversion itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    pub region_order: RegionOrder,
    pub min_region_area: u64,
    pub cell_layout: CellLayout,
}

impl ConversionOptions {
    pub fn detector(&self) -> DetectorOptions {
        DetectorOptions {
            order: self.region_order,
            min_area: self.min_region_area,
        }
    }
}

// ServiceConfig is built once at startup and shared read-only with handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    /// Parent of the per-request workspaces. A temp dir is created when unset.
    pub upload_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub conversion: ConversionOptions,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            upload_dir: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            conversion: ConversionOptions::default(),
        }
    }
}

impl ServiceConfig {
    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
