use sorng_core::{TransferError, TransferErrorKind, TransferResult};

/// Run a block-style closure on tokio's blocking pool.
///
/// The FTP and SSH libraries are synchronous; async callers wrap a whole
/// block (connect, operations, close) in one call.
pub async fn run_blocking<T, F>(f: F) -> TransferResult<T>
where
    F: FnOnce() -> TransferResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        TransferError::new(
            TransferErrorKind::Unknown,
            format!("Transfer task panicked: {e}"),
        )
    })?
}
