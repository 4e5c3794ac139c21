//! TCP + TLS transport: establishes the FTP control connection.
//!
//! Handles plain-TCP connect, implicit-FTPS wrapping and the explicit
//! AUTH TLS upgrade. Timeouts come from `FtpConnectionConfig` and cover the
//! welcome banner as well as every later reply.

use crate::ftp::backend::{FtpBackend, FtpConnector};
use crate::ftp::client::SuppaFtpBackend;
use crate::ftp::error::map_ftp_error;
use crate::ftp::tls::build_tls_connector;
use crate::ftp::types::{FtpConnectionConfig, FtpSecurityMode};
use sorng_core::{TransferError, TransferResult};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use suppaftp::{FtpError, Mode, NativeTlsFtpStream};
use tracing::debug;

/// Connector backed by `suppaftp` with `native-tls`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppaFtpConnector;

impl FtpConnector for SuppaFtpConnector {
    fn open(&self, config: &FtpConnectionConfig) -> TransferResult<Box<dyn FtpBackend>> {
        let stream = connect(config)?;
        Ok(Box::new(SuppaFtpBackend::new(stream)))
    }
}

/// Establish the control connection, upgrading to TLS when required.
pub fn connect(config: &FtpConnectionConfig) -> TransferResult<NativeTlsFtpStream> {
    if config.host.is_empty() {
        return Err(TransferError::invalid_config("Host must not be empty"));
    }

    let addr = config.address();
    let dur = Duration::from_secs(config.timeout_sec.max(1));
    let socket = resolve(&addr)?;

    let mut stream = match config.security {
        FtpSecurityMode::Implicit => connect_implicit(config, socket, dur)?,
        FtpSecurityMode::Explicit | FtpSecurityMode::None => {
            let tcp = open_socket(socket, dur)?;
            let plain = NativeTlsFtpStream::connect_with_stream(tcp)
                .map_err(|e| map_ftp_error(&format!("FTP greeting from {}", addr), e))?;
            if config.security == FtpSecurityMode::Explicit {
                let connector = build_tls_connector(config.accept_invalid_certs)?;
                plain.into_secure(connector, &config.host).map_err(|e| {
                    TransferError::tls_failed(format!("AUTH TLS upgrade with {}: {}", addr, e))
                })?
            } else {
                plain
            }
        }
    };

    stream.set_mode(Mode::Passive);

    debug!("FTP control connection to {} established ({:?})", addr, config.security);
    Ok(stream)
}

/// TCP connect bounded by `dur`, with read and write timeouts set before
/// the first byte is exchanged.
fn open_socket(socket: SocketAddr, dur: Duration) -> TransferResult<TcpStream> {
    let tcp = TcpStream::connect_timeout(&socket, dur).map_err(|e| {
        map_ftp_error(&format!("TCP connect to {}", socket), FtpError::ConnectionError(e))
    })?;
    tcp.set_read_timeout(Some(dur))?;
    tcp.set_write_timeout(Some(dur))?;
    Ok(tcp)
}

/// Implicit FTPS has no stream-based constructor, so the handshake runs on a
/// helper thread and the caller stops waiting once `dur` has passed.
fn connect_implicit(
    config: &FtpConnectionConfig,
    socket: SocketAddr,
    dur: Duration,
) -> TransferResult<NativeTlsFtpStream> {
    let connector = build_tls_connector(config.accept_invalid_certs)?;
    let domain = config.host.clone();
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("ftps-implicit-connect".into())
        .spawn(move || {
            let _ = tx.send(NativeTlsFtpStream::connect_secure_implicit(socket, connector, &domain));
        })
        .map_err(|e| TransferError::connection_failed(format!("Cannot spawn connect thread: {}", e)))?;

    let stream = match rx.recv_timeout(dur) {
        Ok(result) => result
            .map_err(|e| map_ftp_error(&format!("Implicit FTPS connect to {}", socket), e))?,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            return Err(TransferError::timeout(format!(
                "Implicit FTPS connect to {} timed out after {}s",
                socket,
                dur.as_secs()
            )))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            return Err(TransferError::connection_failed(format!(
                "Implicit FTPS connect to {} aborted",
                socket
            )))
        }
    };
    stream.get_ref().set_read_timeout(Some(dur))?;
    stream.get_ref().set_write_timeout(Some(dur))?;
    Ok(stream)
}

fn resolve(addr: &str) -> TransferResult<SocketAddr> {
    addr.to_socket_addrs()
        .map_err(|e| TransferError::connection_failed(format!("DNS lookup for {}: {}", addr, e)))?
        .next()
        .ok_or_else(|| TransferError::connection_failed(format!("DNS returned no addresses for {}", addr)))
}
