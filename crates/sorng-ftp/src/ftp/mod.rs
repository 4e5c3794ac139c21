//! # sorng-ftp: FTP, FTPS and FTPES sessions
//!
//! Architecture:
//! - `types`: connection config, security and data-channel modes
//! - `error`: mapping of library errors into `TransferError`
//! - `backend`: the `FtpBackend` / `FtpConnector` seam
//! - `tls`: TLS connector for implicit and explicit FTPS
//! - `connection`: TCP + TLS transport, `SuppaFtpConnector`
//! - `client`: `SuppaFtpBackend`, one library call per method
//! - `session`: `FtpSession`: lazy connect, logged operations, close on drop

pub mod types;
pub mod error;
pub mod backend;
pub mod tls;
pub mod connection;
pub mod client;
pub mod session;

pub use backend::{FtpBackend, FtpConnector};
pub use connection::SuppaFtpConnector;
pub use session::FtpSession;
pub use types::*;
