//! Seam between [`FtpSession`](crate::ftp::session::FtpSession) and the
//! wrapped FTP library. One method per library call.

use crate::ftp::types::FtpConnectionConfig;
use chrono::{DateTime, Utc};
use sorng_core::TransferResult;
use std::path::Path;

/// An open control connection.
pub trait FtpBackend: Send {
    fn login(&mut self, username: &str, password: &str) -> TransferResult<()>;
    fn pwd(&mut self) -> TransferResult<String>;
    fn cwd(&mut self, path: &str) -> TransferResult<()>;
    /// Raw `LIST` lines.
    fn list(&mut self, path: Option<&str>) -> TransferResult<Vec<String>>;
    fn mkdir(&mut self, path: &str) -> TransferResult<()>;
    fn rmdir(&mut self, path: &str) -> TransferResult<()>;
    fn delete(&mut self, path: &str) -> TransferResult<()>;
    fn rename(&mut self, from: &str, to: &str) -> TransferResult<()>;
    fn size(&mut self, path: &str) -> TransferResult<u64>;
    fn mdtm(&mut self, path: &str) -> TransferResult<DateTime<Utc>>;
    /// Binary `STOR` of a local file; returns bytes written.
    fn put_file(&mut self, local: &Path, remote: &str) -> TransferResult<u64>;
    /// Binary `RETR` into a local file; returns bytes read.
    fn get_file(&mut self, remote: &str, local: &Path) -> TransferResult<u64>;
    fn quit(&mut self) -> TransferResult<()>;
}

/// Opens control connections (TCP, optional TLS). Login is left to the session.
pub trait FtpConnector: Send + Sync {
    fn open(&self, config: &FtpConnectionConfig) -> TransferResult<Box<dyn FtpBackend>>;
}
