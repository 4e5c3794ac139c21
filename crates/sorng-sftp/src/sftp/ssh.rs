// ── ssh2 adapter: connect, host-key check, auth, SFTP calls ────────────────

use crate::sftp::backend::{SftpBackend, SftpConnector};
use crate::sftp::stat::stat_to_file_stat;
use crate::sftp::types::{KnownHostsPolicy, SftpConnectionConfig, SftpFileStat};
use sorng_core::{TransferError, TransferErrorKind, TransferResult};
use ssh2::{CheckResult, ErrorCode, KnownHostFileKind, Session, Sftp};
use std::fs::File;
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

// libssh2 / SFTP status codes we classify.
const SFTP_NO_SUCH_FILE: i32 = 2;
const SFTP_PERMISSION_DENIED: i32 = 3;
const SFTP_NO_SUCH_PATH: i32 = 10;
const SESSION_TIMEOUT: i32 = -9;
const SESSION_AUTH_FAILED: i32 = -18;

/// Classify an `ssh2::Error`; `context` prefixes the message.
pub(crate) fn map_ssh_error(context: &str, err: ssh2::Error) -> TransferError {
    let message = format!("{}: {}", context, err.message());
    let code = err.code();
    let kind = match code {
        ErrorCode::SFTP(SFTP_NO_SUCH_FILE) | ErrorCode::SFTP(SFTP_NO_SUCH_PATH) => {
            TransferErrorKind::NotFound
        }
        ErrorCode::SFTP(SFTP_PERMISSION_DENIED) => TransferErrorKind::PermissionDenied,
        ErrorCode::SFTP(_) => TransferErrorKind::CommandRejected,
        ErrorCode::Session(SESSION_TIMEOUT) => TransferErrorKind::Timeout,
        ErrorCode::Session(SESSION_AUTH_FAILED) => TransferErrorKind::AuthFailed,
        ErrorCode::Session(_) => TransferErrorKind::ProtocolError,
    };
    let mapped = TransferError::new(kind, message);
    match code {
        ErrorCode::SFTP(status) => match u16::try_from(status) {
            Ok(status) => mapped.with_code(status),
            Err(_) => mapped,
        },
        ErrorCode::Session(_) => mapped,
    }
}

/// Expand a leading `~/` against the local home directory.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

// ── Connector ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct Ssh2Connector;

impl SftpConnector for Ssh2Connector {
    fn open(&self, config: &SftpConnectionConfig) -> TransferResult<Box<dyn SftpBackend>> {
        let session = connect(config)?;
        let sftp = session
            .sftp()
            .map_err(|e| map_ssh_error("Opening SFTP subsystem", e))?;
        Ok(Box::new(Ssh2Backend { session, sftp }))
    }
}

/// TCP connect, handshake, host-key verification and authentication.
pub fn connect(config: &SftpConnectionConfig) -> TransferResult<Session> {
    if config.host.is_empty() {
        return Err(TransferError::invalid_config("Host must not be empty"));
    }
    let username = config.username.as_deref().ok_or_else(|| {
        TransferError::invalid_config(format!("No username configured for SFTP host {}", config.host))
    })?;

    let addr = config.address();
    let timeout = Duration::from_secs(config.timeout_secs);
    let socket = addr
        .to_socket_addrs()
        .map_err(|e| TransferError::connection_failed(format!("DNS lookup for {}: {}", addr, e)))?
        .next()
        .ok_or_else(|| TransferError::connection_failed(format!("DNS returned no addresses for {}", addr)))?;

    let tcp = TcpStream::connect_timeout(&socket, timeout)
        .map_err(|e| TransferError::connection_failed(format!("TCP connection to {} failed: {}", addr, e)))?;

    let mut session = Session::new().map_err(|e| map_ssh_error("Creating SSH session", e))?;
    session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
    session.set_tcp_stream(tcp);
    session
        .handshake()
        .map_err(|e| map_ssh_error(&format!("SSH handshake with {}", addr), e))?;

    if config.known_hosts_policy == KnownHostsPolicy::Strict {
        verify_host_key(&session, config)?;
    }

    let method = authenticate(&session, username, config)?;
    info!("SFTP authenticated to {} via {}", addr, method);
    Ok(session)
}

fn verify_host_key(session: &Session, config: &SftpConnectionConfig) -> TransferResult<()> {
    let known_hosts_path = dirs::home_dir()
        .map(|h| h.join(".ssh").join("known_hosts"))
        .ok_or_else(|| TransferError::invalid_config("Cannot locate ~/.ssh/known_hosts"))?;

    let mut known = session
        .known_hosts()
        .map_err(|e| map_ssh_error("Loading known hosts", e))?;
    known
        .read_file(&known_hosts_path, KnownHostFileKind::OpenSSH)
        .map_err(|e| map_ssh_error(&format!("Reading {}", known_hosts_path.display()), e))?;

    let (key, _) = session
        .host_key()
        .ok_or_else(|| TransferError::protocol_error("Server presented no host key"))?;

    match known.check_port(&config.host, config.port, key) {
        CheckResult::Match => Ok(()),
        CheckResult::NotFound => Err(TransferError::auth_failed(format!(
            "Host key for {} not found in {}",
            config.address(),
            known_hosts_path.display()
        ))),
        CheckResult::Mismatch => Err(TransferError::auth_failed(format!(
            "Host key for {} does not match {}",
            config.address(),
            known_hosts_path.display()
        ))),
        CheckResult::Failure => Err(TransferError::protocol_error(format!(
            "Host key check for {} failed",
            config.address()
        ))),
    }
}

/// Non-interactive: public key (when configured), then password.
fn authenticate(
    session: &Session,
    username: &str,
    config: &SftpConnectionConfig,
) -> TransferResult<&'static str> {
    let mut last_error = None;

    if let Some(ref key_path) = config.private_key_path {
        let key = expand_home(key_path);
        let passphrase = config.private_key_passphrase.as_deref();
        match session.userauth_pubkey_file(username, None, &key, passphrase) {
            Ok(()) if session.authenticated() => return Ok("publickey"),
            Ok(()) => {}
            Err(e) => {
                debug!("Public-key auth with {} failed: {}", key.display(), e);
                last_error = Some(map_ssh_error("Public-key auth", e));
            }
        }
    }

    if let Some(ref password) = config.password {
        match session.userauth_password(username, password) {
            Ok(()) if session.authenticated() => return Ok("password"),
            Ok(()) => {}
            Err(e) => last_error = Some(map_ssh_error("Password auth", e)),
        }
    }

    let mut err = last_error.unwrap_or_else(|| {
        TransferError::auth_failed(format!(
            "No authentication method succeeded for '{}'",
            username
        ))
    });
    err.kind = TransferErrorKind::AuthFailed;
    Err(err)
}

// ── Backend ──────────────────────────────────────────────────────────────────

pub struct Ssh2Backend {
    session: Session,
    sftp: Sftp,
}

impl SftpBackend for Ssh2Backend {
    fn upload(&mut self, local: &Path, remote: &str) -> TransferResult<u64> {
        let mut local_file = File::open(local).map_err(|e| {
            TransferError::io_error(format!("Failed to open '{}': {}", local.display(), e))
        })?;
        let mut remote_file = self
            .sftp
            .create(Path::new(remote))
            .map_err(|e| map_ssh_error(&format!("Failed to open remote '{}'", remote), e))?;
        io::copy(&mut local_file, &mut remote_file).map_err(|e| {
            TransferError::transfer_failed(format!("Upload to '{}': {}", remote, e))
        })
    }

    fn download(&mut self, remote: &str, local: &Path) -> TransferResult<u64> {
        let mut remote_file = self
            .sftp
            .open(Path::new(remote))
            .map_err(|e| map_ssh_error(&format!("Failed to open remote '{}'", remote), e))?;
        let mut local_file = File::create(local).map_err(|e| {
            TransferError::io_error(format!("Failed to create '{}': {}", local.display(), e))
        })?;
        io::copy(&mut remote_file, &mut local_file).map_err(|e| {
            TransferError::transfer_failed(format!("Download of '{}': {}", remote, e))
        })
    }

    fn stat(&mut self, path: &str) -> TransferResult<SftpFileStat> {
        let raw = self
            .sftp
            .stat(Path::new(path))
            .map_err(|e| map_ssh_error(&format!("stat '{}'", path), e))?;
        Ok(stat_to_file_stat(path, &raw))
    }

    fn unlink(&mut self, path: &str) -> TransferResult<()> {
        self.sftp
            .unlink(Path::new(path))
            .map_err(|e| map_ssh_error(&format!("unlink '{}'", path), e))
    }

    fn rename(&mut self, from: &str, to: &str) -> TransferResult<()> {
        self.sftp
            .rename(Path::new(from), Path::new(to), None)
            .map_err(|e| map_ssh_error(&format!("rename '{}' → '{}'", from, to), e))
    }

    fn mkdir(&mut self, path: &str, mode: i32) -> TransferResult<()> {
        self.sftp
            .mkdir(Path::new(path), mode)
            .map_err(|e| map_ssh_error(&format!("mkdir '{}'", path), e))
    }

    fn rmdir(&mut self, path: &str) -> TransferResult<()> {
        self.sftp
            .rmdir(Path::new(path))
            .map_err(|e| map_ssh_error(&format!("rmdir '{}'", path), e))
    }

    fn realpath(&mut self, path: &str) -> TransferResult<String> {
        self.sftp
            .realpath(Path::new(path))
            .map(|p| p.to_string_lossy().to_string())
            .map_err(|e| map_ssh_error(&format!("realpath '{}'", path), e))
    }

    fn readdir(&mut self, path: &str) -> TransferResult<Vec<String>> {
        let entries = self
            .sftp
            .readdir(Path::new(path))
            .map_err(|e| map_ssh_error(&format!("readdir '{}'", path), e))?;
        Ok(entries
            .into_iter()
            .filter_map(|(p, _)| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .filter(|n| n != "." && n != "..")
            .collect())
    }

    fn disconnect(&mut self) -> TransferResult<()> {
        self.session
            .disconnect(None, "closing", None)
            .map_err(|e| map_ssh_error("SSH disconnect", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sftp_no_such_file_is_not_found() {
        let err = map_ssh_error("stat 'x'", ssh2::Error::new(ErrorCode::SFTP(2), "no such file"));
        assert!(err.is_not_found());
        let err = map_ssh_error("stat 'x'", ssh2::Error::new(ErrorCode::SFTP(10), "no such path"));
        assert!(err.is_not_found());
    }

    #[test]
    fn sftp_status_kept_as_code() {
        let err = map_ssh_error("stat 'x'", ssh2::Error::new(ErrorCode::SFTP(2), "no such file"));
        assert_eq!(err.code, Some(2));
        assert!(!err.is_permanent());
        let err = map_ssh_error("x", ssh2::Error::new(ErrorCode::Session(-18), "auth"));
        assert_eq!(err.code, None);
    }

    #[test]
    fn other_codes_classified() {
        let denied = map_ssh_error("x", ssh2::Error::new(ErrorCode::SFTP(3), "denied"));
        assert_eq!(denied.kind, TransferErrorKind::PermissionDenied);
        let auth = map_ssh_error("x", ssh2::Error::new(ErrorCode::Session(-18), "auth"));
        assert_eq!(auth.kind, TransferErrorKind::AuthFailed);
        let timeout = map_ssh_error("x", ssh2::Error::new(ErrorCode::Session(-9), "timeout"));
        assert_eq!(timeout.kind, TransferErrorKind::Timeout);
    }

    #[test]
    fn home_expansion() {
        assert_eq!(expand_home("/etc/key"), PathBuf::from("/etc/key"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.ssh/id_rsa"), home.join(".ssh/id_rsa"));
        }
    }

    #[test]
    fn missing_username_rejected_before_dialing() {
        let cfg = SftpConnectionConfig {
            host: "sftp.host".into(),
            ..Default::default()
        };
        let Err(err) = connect(&cfg) else { panic!("expected connect to fail") };
        assert_eq!(err.kind, TransferErrorKind::InvalidConfig);
    }

    #[test]
    fn empty_host_rejected() {
        let Err(err) = connect(&SftpConnectionConfig::default()) else { panic!("expected connect to fail") };
        assert_eq!(err.kind, TransferErrorKind::InvalidConfig);
    }
}
