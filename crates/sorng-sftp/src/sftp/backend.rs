//! Seam between [`SftpSession`](crate::sftp::session::SftpSession) and the
//! SSH library.

use crate::sftp::types::{SftpConnectionConfig, SftpFileStat};
use sorng_core::TransferResult;
use std::path::Path;

/// An authenticated SSH connection with an open SFTP channel.
pub trait SftpBackend: Send {
    /// Copy a local file to `remote`; returns bytes written.
    fn upload(&mut self, local: &Path, remote: &str) -> TransferResult<u64>;
    /// Copy `remote` into a local file; returns bytes read.
    fn download(&mut self, remote: &str, local: &Path) -> TransferResult<u64>;
    fn stat(&mut self, path: &str) -> TransferResult<SftpFileStat>;
    fn unlink(&mut self, path: &str) -> TransferResult<()>;
    fn rename(&mut self, from: &str, to: &str) -> TransferResult<()>;
    fn mkdir(&mut self, path: &str, mode: i32) -> TransferResult<()>;
    fn rmdir(&mut self, path: &str) -> TransferResult<()>;
    fn realpath(&mut self, path: &str) -> TransferResult<String>;
    /// Entry names of a directory, without `.` and `..`.
    fn readdir(&mut self, path: &str) -> TransferResult<Vec<String>>;
    fn disconnect(&mut self) -> TransferResult<()>;
}

/// Opens SSH connections, verifies the host key and authenticates.
pub trait SftpConnector: Send + Sync {
    fn open(&self, config: &SftpConnectionConfig) -> TransferResult<Box<dyn SftpBackend>>;
}
