pub mod ftp;

pub use ftp::{
    FtpBackend, FtpConnectionConfig, FtpConnector, FtpSecurityMode, FtpSession, SuppaFtpConnector,
};
