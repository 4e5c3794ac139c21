// ── SftpSession – lazy connect, logged operations, close on drop ────────────

use crate::sftp::backend::{SftpBackend, SftpConnector};
use crate::sftp::types::{SftpConnectionConfig, SftpFileStat};
use chrono::{DateTime, Utc};
use sorng_core::paths::{absolute, local_basename, remote_basename};
use sorng_core::{TransferError, TransferResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Mode used for `mkdir`.
pub const DIR_MODE: i32 = 0o755;

pub struct SftpSession {
    config: SftpConnectionConfig,
    connector: Arc<dyn SftpConnector>,
    conn: Option<Box<dyn SftpBackend>>,
}

impl SftpSession {
    pub fn new(config: SftpConnectionConfig, connector: Arc<dyn SftpConnector>) -> Self {
        Self {
            config,
            connector,
            conn: None,
        }
    }

    pub fn config(&self) -> &SftpConnectionConfig {
        &self.config
    }

    pub fn username(&mut self, username: impl Into<String>) -> &mut Self {
        self.config.username = Some(username.into());
        self
    }

    pub fn password(&mut self, password: impl Into<String>) -> &mut Self {
        self.config.password = Some(password.into());
        self
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    pub fn connect(&mut self) -> TransferResult<()> {
        if self.conn.is_some() {
            return Ok(());
        }
        info!(
            "Connecting to '{}' with user '{}'",
            self.config.host,
            self.config.display_user()
        );
        self.conn = Some(self.connector.open(&self.config)?);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    pub fn can_connect(&mut self) -> bool {
        match self.connect() {
            Ok(()) => true,
            Err(e) => {
                warn!("SFTP connection to {} failed: {}", self.config.address(), e);
                false
            }
        }
    }

    /// Disconnect if connected; safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            if let Err(e) = conn.disconnect() {
                warn!("SFTP disconnect from {} failed: {}", self.config.address(), e);
            }
            debug!("SFTP session to {} closed", self.config.address());
        }
    }

    fn backend(&mut self) -> TransferResult<&mut Box<dyn SftpBackend>> {
        self.connect()?;
        self.conn
            .as_mut()
            .ok_or_else(|| TransferError::connection_failed("SFTP session is not connected"))
    }

    fn remote_label(&self, path: &str) -> String {
        format!("{}@{}:{}", self.config.display_user(), self.config.host, path)
    }

    // ── Transfers ────────────────────────────────────────────────────────────

    pub fn download(&mut self, remote: &str) -> TransferResult<u64> {
        let local = PathBuf::from(remote_basename(remote));
        self.download_to(remote, &local)
    }

    pub fn download_to(&mut self, remote: &str, local: impl AsRef<Path>) -> TransferResult<u64> {
        let local = local.as_ref();
        self.connect()?;
        info!(
            "Downloading '{}' to '{}'",
            self.remote_label(remote),
            absolute(local).display()
        );
        self.backend()?.download(remote, local)
    }

    pub fn upload(&mut self, local: impl AsRef<Path>) -> TransferResult<u64> {
        let local = local.as_ref();
        let remote = local_basename(local);
        self.upload_to(local, &remote)
    }

    pub fn upload_to(&mut self, local: impl AsRef<Path>, remote: &str) -> TransferResult<u64> {
        let local = local.as_ref();
        self.connect()?;
        info!(
            "Uploading '{}' to '{}'",
            absolute(local).display(),
            self.remote_label(remote)
        );
        self.backend()?.upload(local, remote)
    }

    // ── Metadata ─────────────────────────────────────────────────────────────

    pub fn stat(&mut self, path: &str) -> TransferResult<SftpFileStat> {
        let stat = self.backend()?.stat(path)?;
        info!("Stat '{}'\n{}", path, serde_json::to_string_pretty(&stat)?);
        Ok(stat)
    }

    /// `stat` probe; only a "no such file" status means absent.
    pub fn exists(&mut self, path: &str) -> TransferResult<bool> {
        let found = match self.backend()?.stat(path) {
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => return Err(e),
        };
        info!("Exists '{}': {}", path, found);
        Ok(found)
    }

    pub fn file_size(&mut self, path: &str) -> TransferResult<u64> {
        let size = self.backend()?.stat(path)?.size;
        info!("Size of '{}': {} bytes", path, size);
        Ok(size)
    }

    pub fn mtime(&mut self, path: &str) -> TransferResult<DateTime<Utc>> {
        let stat = self.backend()?.stat(path)?;
        let modified = stat
            .mtime
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| {
                TransferError::protocol_error(format!("Server reported no mtime for '{}'", path))
            })?;
        info!("Modification time of '{}': {}", path, modified.to_rfc3339());
        Ok(modified)
    }

    // ── File & directory operations ──────────────────────────────────────────

    pub fn delete(&mut self, path: &str) -> TransferResult<()> {
        self.connect()?;
        info!("Deleting '{}'", self.remote_label(path));
        self.backend()?.unlink(path)
    }

    pub fn rename(&mut self, from: &str, to: &str) -> TransferResult<()> {
        self.connect()?;
        info!("Renaming '{}' to '{}'", self.remote_label(from), to);
        self.backend()?.rename(from, to)
    }

    pub fn mkdir(&mut self, dir: &str) -> TransferResult<()> {
        self.connect()?;
        info!("Creating directory '{}'", self.remote_label(dir));
        self.backend()?.mkdir(dir, DIR_MODE)
    }

    pub fn rmdir(&mut self, dir: &str) -> TransferResult<()> {
        self.connect()?;
        info!("Removing directory '{}'", self.remote_label(dir));
        self.backend()?.rmdir(dir)
    }

    /// Server-side `realpath(".")`.
    pub fn pwd(&mut self) -> TransferResult<String> {
        self.backend()?.realpath(".")
    }

    pub fn list(&mut self, path: &str) -> TransferResult<Vec<String>> {
        let names = self.backend()?.readdir(path)?;
        info!("Listing files in {}\n{}", path, names.join("\n"));
        Ok(names)
    }
}

impl Drop for SftpSession {
    fn drop(&mut self) {
        self.close();
    }
}
