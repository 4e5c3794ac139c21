// ── Types ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};
use sorng_core::{Protocol, ResolvedTarget, TransferError, TransferResult};

fn default_sftp_port() -> u16 {
    22
}
fn default_timeout_secs() -> u64 {
    sorng_core::DEFAULT_TIMEOUT_SECS
}

// ── Connection & Authentication ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SftpConnectionConfig {
    pub host: String,
    #[serde(default = "default_sftp_port")]
    pub port: u16,
    /// Required by the time the session connects.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub private_key_path: Option<String>,
    #[serde(default)]
    pub private_key_passphrase: Option<String>,
    #[serde(default)]
    pub known_hosts_policy: KnownHostsPolicy,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum KnownHostsPolicy {
    /// Accept any host key.
    #[default]
    Ignore,
    /// Host key must match `~/.ssh/known_hosts`.
    Strict,
}

impl Default for SftpConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_sftp_port(),
            username: None,
            password: None,
            private_key_path: None,
            private_key_passphrase: None,
            known_hosts_policy: KnownHostsPolicy::Ignore,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SftpConnectionConfig {
    pub fn from_target(target: &ResolvedTarget) -> TransferResult<Self> {
        if target.protocol != Protocol::Sftp {
            return Err(TransferError::invalid_config(format!(
                "{} targets cannot be opened as an SFTP session",
                target.protocol
            )));
        }
        Ok(Self {
            host: target.host.clone(),
            port: target.port,
            username: target.username.clone(),
            password: target.password.clone(),
            private_key_path: target.key.clone(),
            private_key_passphrase: target.passphrase.clone(),
            known_hosts_policy: KnownHostsPolicy::Ignore,
            timeout_secs: target.timeout_secs,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Auth methods in the order they will be attempted.
    pub fn auth_methods(&self) -> Vec<&'static str> {
        let mut methods = Vec::new();
        if self.private_key_path.is_some() {
            methods.push("publickey");
        }
        if self.password.is_some() {
            methods.push("password");
        }
        methods
    }

    pub fn display_user(&self) -> &str {
        self.username.as_deref().unwrap_or("")
    }
}

// ── File Stat ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SftpEntryType {
    File,
    Directory,
    Symlink,
    BlockDevice,
    CharDevice,
    NamedPipe,
    Socket,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SftpFileStat {
    pub path: String,
    pub size: u64,
    pub uid: u32,
    pub gid: u32,
    pub permissions: u32,
    pub permissions_string: String,
    /// Seconds since the epoch.
    pub atime: Option<u64>,
    pub mtime: Option<u64>,
    pub kind: SftpEntryType,
}

impl SftpFileStat {
    pub fn is_dir(&self) -> bool {
        self.kind == SftpEntryType::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == SftpEntryType::File
    }
}
