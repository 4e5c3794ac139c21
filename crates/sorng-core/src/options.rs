//! Option layering: call-site override → named profile → protocol default.

use crate::profile::ConnectionProfile;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Entry-point flavour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Protocol {
    /// Plain FTP.
    Ftp,
    /// Implicit FTPS (TLS from the first byte).
    Ftps,
    /// Explicit FTPS (AUTH TLS upgrade).
    Ftpes,
    Sftp,
}

impl Protocol {
    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Ftp | Protocol::Ftpes => 21,
            Protocol::Ftps => 990,
            Protocol::Sftp => 22,
        }
    }

    pub fn scheme(self) -> &'static str {
        match self {
            Protocol::Ftp => "ftp",
            Protocol::Ftps => "ftps",
            Protocol::Ftpes => "ftpes",
            Protocol::Sftp => "sftp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Call-site overrides. Anything left `None` falls through to the profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectOptions {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub port: Option<u16>,
    pub key: Option<String>,
    pub passphrase: Option<String>,
    /// Skip certificate / host-name verification (FTPS, FTPES).
    pub accept_invalid_certs: Option<bool>,
    pub timeout_secs: Option<u64>,
}

impl ConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = Some(accept);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

/// Fully merged connection target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTarget {
    pub protocol: Protocol,
    /// Name the block was opened with.
    pub name: String,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub key: Option<String>,
    pub passphrase: Option<String>,
    pub accept_invalid_certs: bool,
    pub timeout_secs: u64,
}

impl ResolvedTarget {
    /// Merge the three layers. An unknown name simply becomes the host.
    pub fn resolve(
        protocol: Protocol,
        name: &str,
        opts: &ConnectOptions,
        profile: Option<&ConnectionProfile>,
    ) -> Self {
        let fallback = ConnectionProfile::default();
        let profile = profile.unwrap_or(&fallback);

        let pick = |explicit: &Option<String>, configured: &Option<String>| {
            explicit.clone().or_else(|| configured.clone())
        };

        Self {
            protocol,
            name: name.to_string(),
            host: pick(&opts.host, &profile.host).unwrap_or_else(|| name.to_string()),
            port: opts
                .port
                .or(profile.port)
                .unwrap_or_else(|| protocol.default_port()),
            username: pick(&opts.username, &profile.username),
            password: pick(&opts.password, &profile.password),
            key: pick(&opts.key, &profile.key),
            passphrase: pick(&opts.passphrase, &profile.passphrase),
            accept_invalid_certs: opts.accept_invalid_certs.unwrap_or(false),
            timeout_secs: opts.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Username for log lines; empty when none was resolved.
    pub fn display_user(&self) -> &str {
        self.username.as_deref().unwrap_or("")
    }
}
