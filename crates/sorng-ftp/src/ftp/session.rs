//! Per-block FTP session: lazy connect, one logged library call per
//! operation, idempotent close (also on drop).

use crate::ftp::backend::{FtpBackend, FtpConnector};
use crate::ftp::types::FtpConnectionConfig;
use chrono::{DateTime, Utc};
use sorng_core::paths::{absolute, local_basename, remote_basename, remote_join};
use sorng_core::{TransferError, TransferResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct FtpSession {
    config: FtpConnectionConfig,
    connector: Arc<dyn FtpConnector>,
    stream: Option<Box<dyn FtpBackend>>,
}

impl FtpSession {
    pub fn new(config: FtpConnectionConfig, connector: Arc<dyn FtpConnector>) -> Self {
        Self {
            config,
            connector,
            stream: None,
        }
    }

    pub fn config(&self) -> &FtpConnectionConfig {
        &self.config
    }

    /// Override the login user; applies to the next connect.
    pub fn username(&mut self, username: impl Into<String>) -> &mut Self {
        self.config.username = Some(username.into());
        self
    }

    /// Override the login password; applies to the next connect.
    pub fn password(&mut self, password: impl Into<String>) -> &mut Self {
        self.config.password = Some(password.into());
        self
    }

    // ─── Lifecycle ───────────────────────────────────────────────

    /// Open and log in unless a connection is already live.
    pub fn connect(&mut self) -> TransferResult<()> {
        if self.stream.is_some() {
            return Ok(());
        }
        info!(
            "Connecting to '{}' with user '{}'",
            self.config.host,
            self.config.login_user()
        );
        let mut stream = self.connector.open(&self.config)?;
        stream.login(self.config.login_user(), self.config.login_password())?;
        self.stream = Some(stream);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// `connect()` with every error swallowed.
    pub fn can_connect(&mut self) -> bool {
        match self.connect() {
            Ok(()) => true,
            Err(e) => {
                warn!("FTP connection to {} failed: {}", self.config.address(), e);
                false
            }
        }
    }

    /// Send QUIT and drop the connection. No-op when not connected.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.quit() {
                warn!("FTP QUIT to {} failed: {}", self.config.address(), e);
            }
            debug!("FTP session to {} closed", self.config.address());
        }
    }

    fn backend(&mut self) -> TransferResult<&mut Box<dyn FtpBackend>> {
        self.connect()?;
        match self.stream.as_mut() {
            Some(stream) => Ok(stream),
            None => Err(TransferError::connection_failed("FTP session is not connected")),
        }
    }

    fn remote_label(&self, cwd: &str, path: &str) -> String {
        format!(
            "{}@{}:{}",
            self.config.login_user(),
            self.config.host,
            remote_join(cwd, path)
        )
    }

    // ─── Transfers ───────────────────────────────────────────────

    /// Download into the current directory under the remote file name.
    pub fn download(&mut self, remote: &str) -> TransferResult<u64> {
        let local = PathBuf::from(remote_basename(remote));
        self.download_to(remote, &local)
    }

    pub fn download_to(&mut self, remote: &str, local: impl AsRef<Path>) -> TransferResult<u64> {
        let local = local.as_ref();
        let cwd = self.backend()?.pwd()?;
        info!(
            "Downloading '{}' to '{}'",
            self.remote_label(&cwd, remote),
            absolute(local).display()
        );
        self.backend()?.get_file(remote, local)
    }

    /// Upload into the remote working directory under the local file name.
    pub fn upload(&mut self, local: impl AsRef<Path>) -> TransferResult<u64> {
        let local = local.as_ref();
        let remote = local_basename(local);
        self.upload_to(local, &remote)
    }

    pub fn upload_to(&mut self, local: impl AsRef<Path>, remote: &str) -> TransferResult<u64> {
        let local = local.as_ref();
        let cwd = self.backend()?.pwd()?;
        info!(
            "Uploading '{}' to '{}'",
            absolute(local).display(),
            self.remote_label(&cwd, remote)
        );
        self.backend()?.put_file(local, remote)
    }

    // ─── Directory operations ────────────────────────────────────

    /// Raw `LIST` output of `path` (working directory when `None`).
    pub fn list(&mut self, path: Option<&str>) -> TransferResult<Vec<String>> {
        let files = self.backend()?.list(path)?;
        let cwd = self.backend()?.pwd()?;
        let shown = match path {
            Some(p) => remote_join(&cwd, p),
            None => cwd,
        };
        info!("Listing files in {}\n{}", shown, files.join("\n"));
        Ok(files)
    }

    pub fn mkdir(&mut self, dir: &str) -> TransferResult<()> {
        let cwd = self.backend()?.pwd()?;
        info!("Creating directory '{}'", self.remote_label(&cwd, dir));
        self.backend()?.mkdir(dir)
    }

    pub fn rmdir(&mut self, dir: &str) -> TransferResult<()> {
        let cwd = self.backend()?.pwd()?;
        info!("Removing directory '{}'", self.remote_label(&cwd, dir));
        self.backend()?.rmdir(dir)
    }

    pub fn delete(&mut self, file: &str) -> TransferResult<()> {
        let cwd = self.backend()?.pwd()?;
        info!("Deleting '{}'", self.remote_label(&cwd, file));
        self.backend()?.delete(file)
    }

    pub fn rename(&mut self, from: &str, to: &str) -> TransferResult<()> {
        let cwd = self.backend()?.pwd()?;
        info!(
            "Renaming '{}' to '{}'",
            self.remote_label(&cwd, from),
            remote_join(&cwd, to)
        );
        self.backend()?.rename(from, to)
    }

    pub fn chdir(&mut self, path: &str) -> TransferResult<()> {
        info!("Changing directory to '{}'", path);
        self.backend()?.cwd(path)
    }

    pub fn pwd(&mut self) -> TransferResult<String> {
        self.backend()?.pwd()
    }

    // ─── Queries ─────────────────────────────────────────────────

    /// `SIZE` probe. A permanent negative reply means "absent".
    pub fn exists(&mut self, path: &str) -> TransferResult<bool> {
        let found = match self.backend()?.size(path) {
            Ok(_) => true,
            Err(e) if e.is_not_found() || e.is_permanent() => false,
            Err(e) => return Err(e),
        };
        info!("Exists '{}': {}", path, found);
        Ok(found)
    }

    pub fn file_size(&mut self, path: &str) -> TransferResult<u64> {
        let size = self.backend()?.size(path)?;
        info!("Size of '{}': {} bytes", path, size);
        Ok(size)
    }

    pub fn mtime(&mut self, path: &str) -> TransferResult<DateTime<Utc>> {
        let modified = self.backend()?.mdtm(path)?;
        info!("Modification time of '{}': {}", path, modified.to_rfc3339());
        Ok(modified)
    }
}

impl Drop for FtpSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ftp::types::FtpSecurityMode;
    use chrono::TimeZone;
    use sorng_core::TransferErrorKind;
    use std::collections::HashMap;
    use serial_test::serial;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct FakeState {
        calls: Vec<String>,
        opened: Vec<FtpConnectionConfig>,
        cwd: String,
        remote: HashMap<String, Vec<u8>>,
        refuse_open: bool,
        size_error: Option<TransferError>,
    }

    type Shared = Arc<Mutex<FakeState>>;

    struct FakeConnector(Shared);

    struct FakeBackend(Shared);

    impl FtpConnector for FakeConnector {
        fn open(&self, config: &FtpConnectionConfig) -> TransferResult<Box<dyn FtpBackend>> {
            let mut st = self.0.lock().unwrap();
            if st.refuse_open {
                return Err(TransferError::connection_failed("connection refused"));
            }
            st.opened.push(config.clone());
            if st.cwd.is_empty() {
                st.cwd = "/home/user".into();
            }
            Ok(Box::new(FakeBackend(self.0.clone())))
        }
    }

    impl FakeBackend {
        fn record(&self, call: String) {
            self.0.lock().unwrap().calls.push(call);
        }
    }

    impl FtpBackend for FakeBackend {
        fn login(&mut self, username: &str, password: &str) -> TransferResult<()> {
            self.record(format!("login {} {}", username, password));
            Ok(())
        }
        fn pwd(&mut self) -> TransferResult<String> {
            self.record("pwd".into());
            Ok(self.0.lock().unwrap().cwd.clone())
        }
        fn cwd(&mut self, path: &str) -> TransferResult<()> {
            self.record(format!("cwd {}", path));
            self.0.lock().unwrap().cwd = path.to_string();
            Ok(())
        }
        fn list(&mut self, path: Option<&str>) -> TransferResult<Vec<String>> {
            self.record(format!("list {}", path.unwrap_or("-")));
            let st = self.0.lock().unwrap();
            let mut names: Vec<String> = st.remote.keys().cloned().collect();
            names.sort();
            Ok(names)
        }
        fn mkdir(&mut self, path: &str) -> TransferResult<()> {
            self.record(format!("mkdir {}", path));
            Ok(())
        }
        fn rmdir(&mut self, path: &str) -> TransferResult<()> {
            self.record(format!("rmdir {}", path));
            Ok(())
        }
        fn delete(&mut self, path: &str) -> TransferResult<()> {
            self.record(format!("delete {}", path));
            self.0.lock().unwrap().remote.remove(path);
            Ok(())
        }
        fn rename(&mut self, from: &str, to: &str) -> TransferResult<()> {
            self.record(format!("rename {} {}", from, to));
            let mut st = self.0.lock().unwrap();
            if let Some(data) = st.remote.remove(from) {
                st.remote.insert(to.to_string(), data);
            }
            Ok(())
        }
        fn size(&mut self, path: &str) -> TransferResult<u64> {
            self.record(format!("size {}", path));
            let st = self.0.lock().unwrap();
            if let Some(err) = st.size_error.clone() {
                return Err(err);
            }
            st.remote
                .get(path)
                .map(|d| d.len() as u64)
                .ok_or_else(|| TransferError::from_reply(550, "No such file or directory"))
        }
        fn mdtm(&mut self, path: &str) -> TransferResult<DateTime<Utc>> {
            self.record(format!("mdtm {}", path));
            Ok(Utc.with_ymd_and_hms(2024, 1, 2, 13, 0, 0).unwrap())
        }
        fn put_file(&mut self, local: &Path, remote: &str) -> TransferResult<u64> {
            self.record(format!("put {} {}", local.display(), remote));
            let data = std::fs::read(local)?;
            let len = data.len() as u64;
            self.0.lock().unwrap().remote.insert(remote.to_string(), data);
            Ok(len)
        }
        fn get_file(&mut self, remote: &str, local: &Path) -> TransferResult<u64> {
            self.record(format!("get {} {}", remote, local.display()));
            let data = self
                .0
                .lock()
                .unwrap()
                .remote
                .get(remote)
                .cloned()
                .ok_or_else(|| TransferError::from_reply(550, "No such file"))?;
            std::fs::write(local, &data)?;
            Ok(data.len() as u64)
        }
        fn quit(&mut self) -> TransferResult<()> {
            self.record("quit".into());
            Ok(())
        }
    }

    fn config() -> FtpConnectionConfig {
        FtpConnectionConfig {
            host: "test.host".into(),
            username: Some("user".into()),
            password: Some("pass".into()),
            ..Default::default()
        }
    }

    fn session(state: &Shared) -> FtpSession {
        FtpSession::new(config(), Arc::new(FakeConnector(state.clone())))
    }

    fn calls(state: &Shared) -> Vec<String> {
        state.lock().unwrap().calls.clone()
    }

    #[test]
    fn connect_is_lazy() {
        let state = Shared::default();
        let s = session(&state);
        assert!(!s.is_connected());
        assert!(state.lock().unwrap().opened.is_empty());
    }

    #[test]
    fn connect_is_idempotent() {
        let state = Shared::default();
        let mut s = session(&state);
        s.connect().unwrap();
        s.connect().unwrap();
        s.pwd().unwrap();
        assert_eq!(state.lock().unwrap().opened.len(), 1);
        assert_eq!(calls(&state), vec!["login user pass", "pwd"]);
    }

    #[test]
    fn credentials_set_in_block_apply_on_connect() {
        let state = Shared::default();
        let mut s = FtpSession::new(
            FtpConnectionConfig {
                host: "some-data.host".into(),
                ..Default::default()
            },
            Arc::new(FakeConnector(state.clone())),
        );
        s.username("dummy").password("<some-secret-password>");
        s.connect().unwrap();
        assert_eq!(calls(&state), vec!["login dummy <some-secret-password>"]);
    }

    #[test]
    fn anonymous_login_without_credentials() {
        let state = Shared::default();
        let mut s = FtpSession::new(
            FtpConnectionConfig {
                host: "h".into(),
                ..Default::default()
            },
            Arc::new(FakeConnector(state.clone())),
        );
        s.connect().unwrap();
        assert_eq!(calls(&state), vec!["login anonymous anonymous@"]);
    }

    #[test]
    fn can_connect_swallows_errors() {
        let state = Shared::default();
        state.lock().unwrap().refuse_open = true;
        let mut s = session(&state);
        assert!(!s.can_connect());
        assert!(!s.is_connected());

        state.lock().unwrap().refuse_open = false;
        assert!(s.can_connect());
    }

    #[test]
    fn close_sends_quit_once() {
        let state = Shared::default();
        let mut s = session(&state);
        s.connect().unwrap();
        s.close();
        s.close();
        drop(s);
        let quits = calls(&state).iter().filter(|c| *c == "quit").count();
        assert_eq!(quits, 1);
    }

    #[test]
    fn drop_closes_live_connection() {
        let state = Shared::default();
        {
            let mut s = session(&state);
            s.connect().unwrap();
        }
        assert_eq!(calls(&state).last().map(String::as_str), Some("quit"));
    }

    #[test]
    fn close_without_connect_is_noop() {
        let state = Shared::default();
        let mut s = session(&state);
        s.close();
        assert!(calls(&state).is_empty());
    }

    #[test]
    fn upload_defaults_to_basename() {
        let state = Shared::default();
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("dummy.txt");
        std::fs::write(&local, b"hello").unwrap();

        let mut s = session(&state);
        let written = s.upload(&local).unwrap();
        assert_eq!(written, 5);
        assert!(state.lock().unwrap().remote.contains_key("dummy.txt"));
        assert_eq!(
            calls(&state)[2],
            format!("put {} dummy.txt", local.display())
        );
    }

    #[test]
    fn download_to_writes_local_file() {
        let state = Shared::default();
        state
            .lock()
            .unwrap()
            .remote
            .insert("dummy.txt".into(), b"remote data".to_vec());
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("dummy-ftp.txt");

        let mut s = session(&state);
        let read = s.download_to("dummy.txt", &local).unwrap();
        assert_eq!(read, 11);
        assert_eq!(std::fs::read(&local).unwrap(), b"remote data");
    }

    /// Switches the process working directory and restores it on drop.
    struct CwdGuard(PathBuf);

    impl CwdGuard {
        fn enter(dir: &Path) -> Self {
            let previous = std::env::current_dir().unwrap();
            std::env::set_current_dir(dir).unwrap();
            Self(previous)
        }
    }

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    #[test]
    #[serial]
    fn download_uses_remote_basename_in_cwd() {
        let state = Shared::default();
        state
            .lock()
            .unwrap()
            .remote
            .insert("dir/sub/file.txt".into(), b"nested".to_vec());
        let dir = tempfile::tempdir().unwrap();
        let _cwd = CwdGuard::enter(dir.path());

        let mut s = session(&state);
        assert_eq!(s.download("dir/sub/file.txt").unwrap(), 6);
        assert_eq!(std::fs::read(dir.path().join("file.txt")).unwrap(), b"nested");
        assert!(!dir.path().join("dir").exists());
        assert!(calls(&state).contains(&"get dir/sub/file.txt file.txt".to_string()));
    }

    #[test]
    fn download_of_missing_file_fails() {
        let state = Shared::default();
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&state);
        let err = s.download_to("missing.txt", dir.path().join("x")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn directory_operations_delegate() {
        let state = Shared::default();
        let mut s = session(&state);
        s.mkdir("testdir").unwrap();
        s.rmdir("testdir").unwrap();
        s.delete("file.txt").unwrap();
        s.rename("old.txt", "new.txt").unwrap();
        s.chdir("/new/path").unwrap();
        assert_eq!(s.pwd().unwrap(), "/new/path");

        let c = calls(&state);
        assert!(c.contains(&"mkdir testdir".to_string()));
        assert!(c.contains(&"rmdir testdir".to_string()));
        assert!(c.contains(&"delete file.txt".to_string()));
        assert!(c.contains(&"rename old.txt new.txt".to_string()));
        assert!(c.contains(&"cwd /new/path".to_string()));
    }

    #[test]
    fn list_passes_path_through() {
        let state = Shared::default();
        state.lock().unwrap().remote.insert("file1.txt".into(), vec![]);
        let mut s = session(&state);
        let files = s.list(Some("/some/path")).unwrap();
        assert_eq!(files, vec!["file1.txt".to_string()]);
        assert!(calls(&state).contains(&"list /some/path".to_string()));
    }

    #[test]
    fn exists_true_when_size_answers() {
        let state = Shared::default();
        state.lock().unwrap().remote.insert("file.txt".into(), vec![0; 1024]);
        let mut s = session(&state);
        assert!(s.exists("file.txt").unwrap());
        assert_eq!(s.file_size("file.txt").unwrap(), 1024);
    }

    #[test]
    fn exists_false_on_permanent_reply() {
        let state = Shared::default();
        let mut s = session(&state);
        assert!(!s.exists("missing.txt").unwrap());

        state.lock().unwrap().size_error = Some(TransferError::from_reply(500, "SIZE not understood"));
        assert!(!s.exists("missing.txt").unwrap());
    }

    #[test]
    fn exists_propagates_transport_errors() {
        let state = Shared::default();
        state.lock().unwrap().size_error = Some(TransferError::timeout("read timed out"));
        let mut s = session(&state);
        let err = s.exists("file.txt").unwrap_err();
        assert_eq!(err.kind, TransferErrorKind::Timeout);
    }

    #[test]
    fn file_size_error_propagates() {
        let state = Shared::default();
        let mut s = session(&state);
        let err = s.file_size("missing.txt").unwrap_err();
        assert_eq!(err.code, Some(550));
    }

    #[test]
    fn mtime_returns_utc() {
        let state = Shared::default();
        let mut s = session(&state);
        let t = s.mtime("file.txt").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 1, 2, 13, 0, 0).unwrap());
    }

    #[test]
    fn opened_config_keeps_security() {
        let state = Shared::default();
        let mut cfg = config();
        cfg.security = FtpSecurityMode::Explicit;
        let mut s = FtpSession::new(cfg, Arc::new(FakeConnector(state.clone())));
        s.connect().unwrap();
        assert_eq!(state.lock().unwrap().opened[0].security, FtpSecurityMode::Explicit);
    }

    #[test]
    #[traced_test]
    fn operations_are_logged() {
        let state = Shared::default();
        let mut s = session(&state);
        s.mkdir("testdir").unwrap();
        assert!(logs_contain("Connecting to 'test.host' with user 'user'"));
        assert!(logs_contain("Creating directory 'user@test.host:/home/user/testdir'"));
    }

    #[test]
    #[traced_test]
    fn list_without_path_logs_working_directory() {
        let state = Shared::default();
        let mut s = session(&state);
        s.list(None).unwrap();
        assert!(logs_contain("Listing files in /home/user"));
        assert!(!logs_contain("Listing files in /home/user/"));
    }

    #[test]
    #[traced_test]
    fn list_with_path_logs_joined_path() {
        let state = Shared::default();
        let mut s = session(&state);
        s.list(Some("pub")).unwrap();
        assert!(logs_contain("Listing files in /home/user/pub"));
    }
}
