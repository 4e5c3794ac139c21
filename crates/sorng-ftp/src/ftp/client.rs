//! [`FtpBackend`] over a `suppaftp` control connection.

use crate::ftp::backend::FtpBackend;
use crate::ftp::error::map_ftp_error;
use chrono::{DateTime, TimeZone, Utc};
use sorng_core::{TransferError, TransferResult};
use std::fs::File;
use std::path::Path;
use suppaftp::types::FileType;
use suppaftp::NativeTlsFtpStream;

pub struct SuppaFtpBackend {
    stream: NativeTlsFtpStream,
}

impl SuppaFtpBackend {
    pub fn new(stream: NativeTlsFtpStream) -> Self {
        Self { stream }
    }
}

impl FtpBackend for SuppaFtpBackend {
    fn login(&mut self, username: &str, password: &str) -> TransferResult<()> {
        self.stream
            .login(username, password)
            .map_err(|e| map_ftp_error(&format!("Login as '{}'", username), e))?;
        self.stream
            .transfer_type(FileType::Binary)
            .map_err(|e| map_ftp_error("TYPE I", e))
    }

    fn pwd(&mut self) -> TransferResult<String> {
        self.stream.pwd().map_err(|e| map_ftp_error("PWD", e))
    }

    fn cwd(&mut self, path: &str) -> TransferResult<()> {
        self.stream
            .cwd(path)
            .map_err(|e| map_ftp_error(&format!("CWD {}", path), e))
    }

    fn list(&mut self, path: Option<&str>) -> TransferResult<Vec<String>> {
        self.stream
            .list(path)
            .map_err(|e| map_ftp_error(&format!("LIST {}", path.unwrap_or("")), e))
    }

    fn mkdir(&mut self, path: &str) -> TransferResult<()> {
        self.stream
            .mkdir(path)
            .map_err(|e| map_ftp_error(&format!("MKD {}", path), e))
    }

    fn rmdir(&mut self, path: &str) -> TransferResult<()> {
        self.stream
            .rmdir(path)
            .map_err(|e| map_ftp_error(&format!("RMD {}", path), e))
    }

    fn delete(&mut self, path: &str) -> TransferResult<()> {
        self.stream
            .rm(path)
            .map_err(|e| map_ftp_error(&format!("DELE {}", path), e))
    }

    fn rename(&mut self, from: &str, to: &str) -> TransferResult<()> {
        self.stream
            .rename(from, to)
            .map_err(|e| map_ftp_error(&format!("RNFR {} / RNTO {}", from, to), e))
    }

    fn size(&mut self, path: &str) -> TransferResult<u64> {
        self.stream
            .size(path)
            .map(|s| s as u64)
            .map_err(|e| map_ftp_error(&format!("SIZE {}", path), e))
    }

    fn mdtm(&mut self, path: &str) -> TransferResult<DateTime<Utc>> {
        let naive = self
            .stream
            .mdtm(path)
            .map_err(|e| map_ftp_error(&format!("MDTM {}", path), e))?;
        Ok(Utc.from_utc_datetime(&naive))
    }

    fn put_file(&mut self, local: &Path, remote: &str) -> TransferResult<u64> {
        let mut file = File::open(local).map_err(|e| {
            TransferError::io_error(format!("Cannot open '{}': {}", local.display(), e))
        })?;
        self.stream
            .put_file(remote, &mut file)
            .map_err(|e| map_ftp_error(&format!("STOR {}", remote), e))
    }

    fn get_file(&mut self, remote: &str, local: &Path) -> TransferResult<u64> {
        let mut data = self
            .stream
            .retr_as_stream(remote)
            .map_err(|e| map_ftp_error(&format!("RETR {}", remote), e))?;
        let copied = File::create(local)
            .and_then(|mut file| std::io::copy(&mut data, &mut file))
            .map_err(|e| {
                TransferError::io_error(format!("Cannot write '{}': {}", local.display(), e))
            });
        let finalized = self
            .stream
            .finalize_retr_stream(data)
            .map_err(|e| map_ftp_error(&format!("RETR {}", remote), e));
        let bytes = copied?;
        finalized?;
        Ok(bytes)
    }

    fn quit(&mut self) -> TransferResult<()> {
        self.stream.quit().map_err(|e| map_ftp_error("QUIT", e))
    }
}
