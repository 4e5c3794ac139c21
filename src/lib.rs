//! # sorng-transfer
//!
//! Block-style FTP, FTPS, FTPES and SFTP sessions driven by named profiles.
//!
//! ```no_run
//! use sorng_transfer::{Client, ConnectOptions, TransferConfig};
//!
//! # fn main() -> sorng_transfer::TransferResult<()> {
//! let config = TransferConfig::load("transfer.yml")?;
//! sorng_transfer::logging::init(&config)?;
//!
//! let client = Client::new(&config);
//! client.ftp("example", &ConnectOptions::new(), |ftp| {
//!     ftp.upload("report.csv")?;
//!     ftp.list(None)
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod logging;
pub mod task;

pub use client::Client;
pub use task::run_blocking;

pub use sorng_core::{
    ConnectOptions, ConnectionProfile, ProfileRegistry, Protocol, ResolvedTarget, TransferConfig,
    TransferError, TransferErrorKind, TransferResult,
};
pub use sorng_ftp::{FtpBackend, FtpConnectionConfig, FtpConnector, FtpSecurityMode, FtpSession};
pub use sorng_sftp::{
    KnownHostsPolicy, SftpBackend, SftpConnectionConfig, SftpConnector, SftpEntryType,
    SftpFileStat, SftpSession,
};
