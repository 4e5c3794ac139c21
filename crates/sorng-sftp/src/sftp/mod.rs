// ── sorng-sftp / sftp module ──────────────────────────────────────────────────
//
// SFTP sessions for the block-style client:
//   • `SftpSession` with lazy connect and close-on-drop
//   • Non-interactive auth (public key, then password) over ssh2
//   • Optional strict known_hosts verification
//   • Stat conversion with permission strings

pub mod types;
pub mod backend;
pub mod stat;
pub mod ssh;
pub mod session;

pub use backend::{SftpBackend, SftpConnector};
pub use session::SftpSession;
pub use ssh::Ssh2Connector;
pub use stat::format_permissions;
pub use types::*;
