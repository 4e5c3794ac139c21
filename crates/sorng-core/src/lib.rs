//! # SortOfRemote NG – transfer core
//!
//! Shared building blocks for the FTP and SFTP session crates:
//!   • `error`: categorised [`TransferError`]
//!   • `config`: configuration document with named profiles
//!   • `profile`: profile registry keyed by connection name
//!   • `options`: call-site overrides and three-layer resolution
//!   • `paths`: remote/local path helpers for defaults and log lines

pub mod config;
pub mod error;
pub mod options;
pub mod paths;
pub mod profile;

pub use config::TransferConfig;
pub use error::{TransferError, TransferErrorKind, TransferResult};
pub use options::{ConnectOptions, Protocol, ResolvedTarget, DEFAULT_TIMEOUT_SECS};
pub use profile::{ConnectionProfile, ProfileRegistry};
