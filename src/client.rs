use sorng_core::{
    ConnectOptions, ProfileRegistry, Protocol, ResolvedTarget, TransferConfig, TransferResult,
};
use sorng_ftp::{FtpConnectionConfig, FtpConnector, FtpSession, SuppaFtpConnector};
use sorng_sftp::{SftpConnectionConfig, SftpConnector, SftpSession, Ssh2Connector};
use std::sync::Arc;
use tracing::info;

struct ClientInner {
    profiles: ProfileRegistry,
    ftp: Arc<dyn FtpConnector>,
    sftp: Arc<dyn SftpConnector>,
}

/// Entry points for block-style sessions.
///
/// Each call resolves its options against the named profile, hands a fresh
/// session to the block and closes it when the block returns, on success
/// or error.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    pub fn new(config: &TransferConfig) -> Self {
        Self::from_profiles(ProfileRegistry::from_config(config))
    }

    pub fn from_profiles(profiles: ProfileRegistry) -> Self {
        Self::with_connectors(profiles, Arc::new(SuppaFtpConnector), Arc::new(Ssh2Connector))
    }

    /// Use custom connectors, e.g. in-memory fakes.
    pub fn with_connectors(
        profiles: ProfileRegistry,
        ftp: Arc<dyn FtpConnector>,
        sftp: Arc<dyn SftpConnector>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                profiles,
                ftp,
                sftp,
            }),
        }
    }

    pub fn profiles(&self) -> &ProfileRegistry {
        &self.inner.profiles
    }

    /// Merge call-site options, the named profile and protocol defaults.
    pub fn resolve(&self, protocol: Protocol, name: &str, opts: &ConnectOptions) -> ResolvedTarget {
        ResolvedTarget::resolve(protocol, name, opts, self.inner.profiles.get(name))
    }

    // ─── FTP family ──────────────────────────────────────────────

    /// Plain FTP (port 21).
    pub fn ftp<T, F>(&self, name: &str, opts: &ConnectOptions, block: F) -> TransferResult<T>
    where
        F: FnOnce(&mut FtpSession) -> TransferResult<T>,
    {
        self.ftp_block(Protocol::Ftp, name, opts, block)
    }

    /// Implicit FTPS (port 990).
    pub fn ftps<T, F>(&self, name: &str, opts: &ConnectOptions, block: F) -> TransferResult<T>
    where
        F: FnOnce(&mut FtpSession) -> TransferResult<T>,
    {
        self.ftp_block(Protocol::Ftps, name, opts, block)
    }

    /// Explicit FTPS via `AUTH TLS` (port 21).
    pub fn ftpes<T, F>(&self, name: &str, opts: &ConnectOptions, block: F) -> TransferResult<T>
    where
        F: FnOnce(&mut FtpSession) -> TransferResult<T>,
    {
        self.ftp_block(Protocol::Ftpes, name, opts, block)
    }

    fn ftp_block<T, F>(
        &self,
        protocol: Protocol,
        name: &str,
        opts: &ConnectOptions,
        block: F,
    ) -> TransferResult<T>
    where
        F: FnOnce(&mut FtpSession) -> TransferResult<T>,
    {
        let target = self.resolve(protocol, name, opts);
        info!("Connecting to {} with user {}", target.host, target.display_user());
        let config = FtpConnectionConfig::from_target(&target)?;
        let mut session = FtpSession::new(config, self.inner.ftp.clone());
        let result = block(&mut session);
        session.close();
        result
    }

    // ─── SFTP ────────────────────────────────────────────────────

    pub fn sftp<T, F>(&self, name: &str, opts: &ConnectOptions, block: F) -> TransferResult<T>
    where
        F: FnOnce(&mut SftpSession) -> TransferResult<T>,
    {
        let target = self.resolve(Protocol::Sftp, name, opts);
        info!("Connecting to {} with user {}", target.host, target.display_user());
        let config = SftpConnectionConfig::from_target(&target)?;
        let mut session = SftpSession::new(config, self.inner.sftp.clone());
        let result = block(&mut session);
        session.close();
        result
    }
}
