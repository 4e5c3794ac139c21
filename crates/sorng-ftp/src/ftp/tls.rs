//! TLS helpers for Explicit and Implicit FTPS (RFC 4217).

use sorng_core::{TransferError, TransferResult};
use suppaftp::NativeTlsConnector;

/// Build a connector according to our configuration.
pub fn build_tls_connector(accept_invalid_certs: bool) -> TransferResult<NativeTlsConnector> {
    let mut builder = native_tls::TlsConnector::builder();
    if accept_invalid_certs {
        builder.danger_accept_invalid_certs(true);
        builder.danger_accept_invalid_hostnames(true);
    }
    let connector = builder
        .build()
        .map_err(|e| TransferError::tls_failed(format!("TLS connector: {}", e)))?;
    Ok(NativeTlsConnector::from(connector))
}
