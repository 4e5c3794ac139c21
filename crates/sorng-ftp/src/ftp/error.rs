//! Mapping from `suppaftp` errors to [`TransferError`].

use sorng_core::{TransferError, TransferErrorKind};
use std::io;
use suppaftp::FtpError;

/// Classify a library error; `context` prefixes the message.
pub(crate) fn map_ftp_error(context: &str, err: FtpError) -> TransferError {
    let message = format!("{}: {}", context, err);
    match err {
        FtpError::ConnectionError(io) => {
            // A read timeout surfaces as WouldBlock on Unix.
            let would_block = io.kind() == io::ErrorKind::WouldBlock;
            let mut mapped = TransferError::from(io);
            if would_block {
                mapped.kind = TransferErrorKind::Timeout;
            } else if mapped.kind == TransferErrorKind::IoError {
                mapped.kind = TransferErrorKind::ConnectionFailed;
            }
            mapped.message = message;
            mapped
        }
        FtpError::SecureError(_) => TransferError::tls_failed(message),
        FtpError::UnexpectedResponse(resp) => {
            TransferError::from_reply(resp.status.code() as u16, &message)
        }
        FtpError::BadResponse => TransferError::protocol_error(message),
        FtpError::InvalidAddress(_) => TransferError::invalid_config(message),
        #[allow(unreachable_patterns)]
        _ => TransferError::new(TransferErrorKind::Unknown, message),
    }
}
