//! Configuration document.
//!
//! ```yaml
//! log_file: ./logs/transfer.log
//! ftp:
//!   example:
//!     host: some-data.host
//!     username: dummy
//!     password: secret
//!     port: 2121
//! ```

use crate::error::{TransferError, TransferResult};
use crate::profile::ConnectionProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Log destination; stderr when unset.
    pub log_file: Option<PathBuf>,
    /// Env-filter directive, e.g. `info` or `sorng_ftp=debug`.
    pub log_level: Option<String>,
    /// Named connection profiles, shared by every protocol.
    pub ftp: HashMap<String, ConnectionProfile>,
}

impl TransferConfig {
    pub fn from_json_str(s: &str) -> TransferResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_yaml_str(s: &str) -> TransferResult<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Load from disk; the format follows the file extension.
    pub fn load(path: impl AsRef<Path>) -> TransferResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            TransferError::invalid_config(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("yml") | Some("yaml") => Self::from_yaml_str(&text),
            other => Err(TransferError::invalid_config(format!(
                "Unsupported config format {:?} for '{}'",
                other,
                path.display()
            ))),
        }
    }
}
