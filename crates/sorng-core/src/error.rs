//! Transfer error type shared by the FTP and SFTP crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorised transfer error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferError {
    pub kind: TransferErrorKind,
    pub message: String,
    /// FTP reply code or SFTP status code that triggered the error, if any.
    pub code: Option<u16>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransferErrorKind {
    /// TCP / DNS resolution failure.
    ConnectionFailed,
    /// TLS handshake or AUTH TLS failure.
    TlsFailed,
    /// Wrong credentials or no usable auth method.
    AuthFailed,
    /// Server rejected a command.
    CommandRejected,
    /// File or directory not found on the server.
    NotFound,
    /// Permission denied on the server.
    PermissionDenied,
    /// Transfer aborted or incomplete.
    TransferFailed,
    /// Local I/O error (file read/write).
    IoError,
    /// Operation timed out.
    Timeout,
    /// Configuration or parameter validation error.
    InvalidConfig,
    /// Unparseable reply from the server or library.
    ProtocolError,
    Unknown,
}

pub type TransferResult<T> = Result<T, TransferError>;

// ── Construction helpers ─────────────────────────────────────────────

impl TransferError {
    pub fn new(kind: TransferErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::ConnectionFailed, msg)
    }

    pub fn tls_failed(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::TlsFailed, msg)
    }

    pub fn auth_failed(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::AuthFailed, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::NotFound, msg)
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::PermissionDenied, msg)
    }

    pub fn transfer_failed(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::TransferFailed, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::IoError, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::Timeout, msg)
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::InvalidConfig, msg)
    }

    pub fn protocol_error(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::ProtocolError, msg)
    }

    /// Classify an FTP reply code into the most appropriate error kind.
    pub fn from_reply(code: u16, text: &str) -> Self {
        let kind = match code {
            421 => TransferErrorKind::ConnectionFailed,
            425 | 426 | 451 | 452 | 552 => TransferErrorKind::TransferFailed,
            430 | 530 => TransferErrorKind::AuthFailed,
            450 | 550 => {
                let lower = text.to_lowercase();
                if lower.contains("permission") || lower.contains("denied") {
                    TransferErrorKind::PermissionDenied
                } else if lower.contains("not found")
                    || lower.contains("no such")
                    || lower.contains("unavailable")
                {
                    TransferErrorKind::NotFound
                } else {
                    TransferErrorKind::CommandRejected
                }
            }
            _ if code >= 400 => TransferErrorKind::CommandRejected,
            _ => TransferErrorKind::Unknown,
        };
        Self {
            kind,
            message: text.to_string(),
            code: Some(code),
        }
    }

    /// Permanent negative completion reply (5xx).
    pub fn is_permanent(&self) -> bool {
        matches!(self.code, Some(c) if (500..600).contains(&c))
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == TransferErrorKind::NotFound
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.code {
            write!(f, "[{:?} {}] {}", self.kind, code, self.message)
        } else {
            write!(f, "[{:?}] {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for TransferError {}

impl From<std::io::Error> for TransferError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::TimedOut => Self::timeout(format!("I/O timeout: {}", e)),
            std::io::ErrorKind::NotFound => Self::not_found(e.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(e.to_string()),
            _ => Self::io_error(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for TransferError {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid_config(format!("JSON: {}", e))
    }
}

impl From<serde_yaml::Error> for TransferError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::invalid_config(format!("YAML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_550_not_found() {
        let e = TransferError::from_reply(550, "missing.txt: No such file or directory");
        assert_eq!(e.kind, TransferErrorKind::NotFound);
        assert!(e.is_permanent());
    }

    #[test]
    fn reply_550_permission() {
        let e = TransferError::from_reply(550, "Permission denied");
        assert_eq!(e.kind, TransferErrorKind::PermissionDenied);
    }

    #[test]
    fn reply_530_is_auth() {
        let e = TransferError::from_reply(530, "Login incorrect.");
        assert_eq!(e.kind, TransferErrorKind::AuthFailed);
        assert_eq!(e.code, Some(530));
    }

    #[test]
    fn reply_4xx_not_permanent() {
        let e = TransferError::from_reply(450, "busy");
        assert!(!e.is_permanent());
        assert_eq!(e.kind, TransferErrorKind::CommandRejected);
    }

    #[test]
    fn display_includes_code() {
        let e = TransferError::from_reply(553, "bad name");
        assert_eq!(e.to_string(), "[CommandRejected 553] bad name");
        let e = TransferError::timeout("slow");
        assert_eq!(e.to_string(), "[Timeout] slow");
    }

    #[test]
    fn io_not_found_maps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: TransferError = io.into();
        assert!(e.is_not_found());
    }
}
