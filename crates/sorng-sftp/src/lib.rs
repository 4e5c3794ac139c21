pub mod sftp;

pub use sftp::{
    KnownHostsPolicy, SftpBackend, SftpConnectionConfig, SftpConnector, SftpEntryType,
    SftpFileStat, SftpSession, Ssh2Connector,
};
