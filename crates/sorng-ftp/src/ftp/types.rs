//! Shared types for the FTP crate.

use serde::{Deserialize, Serialize};
use sorng_core::{Protocol, ResolvedTarget, TransferError, TransferResult};

pub const ANONYMOUS_USER: &str = "anonymous";
pub const ANONYMOUS_PASSWORD: &str = "anonymous@";

// ─── Connection ──────────────────────────────────────────────────────

/// Security mode for the control channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum FtpSecurityMode {
    /// Plain-text FTP (port 21).
    #[default]
    None,
    /// Explicit FTPS: starts plain then upgrades via AUTH TLS (port 21).
    Explicit,
    /// Implicit FTPS: TLS from the first byte (port 990).
    Implicit,
}

impl FtpSecurityMode {
    pub fn for_protocol(protocol: Protocol) -> TransferResult<Self> {
        match protocol {
            Protocol::Ftp => Ok(Self::None),
            Protocol::Ftpes => Ok(Self::Explicit),
            Protocol::Ftps => Ok(Self::Implicit),
            Protocol::Sftp => Err(TransferError::invalid_config(
                "SFTP targets cannot be opened as an FTP session",
            )),
        }
    }
}

/// Configuration for a single FTP connection. Data connections are always
/// passive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FtpConnectionConfig {
    pub host: String,
    pub port: u16,
    /// Anonymous login when unset.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub security: FtpSecurityMode,
    /// Accept self-signed / untrusted certificates and mismatched host names.
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Connect and read timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_sec: u64,
}

fn default_timeout() -> u64 {
    sorng_core::DEFAULT_TIMEOUT_SECS
}

impl Default for FtpConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 21,
            username: None,
            password: None,
            security: FtpSecurityMode::None,
            accept_invalid_certs: false,
            timeout_sec: default_timeout(),
        }
    }
}

impl FtpConnectionConfig {
    /// Build the connection config for a merged target.
    pub fn from_target(target: &ResolvedTarget) -> TransferResult<Self> {
        Ok(Self {
            host: target.host.clone(),
            port: target.port,
            username: target.username.clone(),
            password: target.password.clone(),
            security: FtpSecurityMode::for_protocol(target.protocol)?,
            accept_invalid_certs: target.accept_invalid_certs,
            timeout_sec: target.timeout_secs,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn login_user(&self) -> &str {
        self.username.as_deref().unwrap_or(ANONYMOUS_USER)
    }

    pub fn login_password(&self) -> &str {
        self.password.as_deref().unwrap_or(ANONYMOUS_PASSWORD)
    }
}
