// ── Stat conversion (ssh2 FileStat → SftpFileStat) ──────────────────────────

use crate::sftp::types::{SftpEntryType, SftpFileStat};

/// Convert an ssh2 `FileStat` + path into our `SftpFileStat`.
pub(crate) fn stat_to_file_stat(path: &str, stat: &ssh2::FileStat) -> SftpFileStat {
    let perm = stat.perm.unwrap_or(0);
    let kind = match entry_type_from_mode(perm) {
        SftpEntryType::Unknown if stat.is_dir() => SftpEntryType::Directory,
        SftpEntryType::Unknown if stat.is_file() => SftpEntryType::File,
        other => other,
    };
    SftpFileStat {
        path: path.to_string(),
        size: stat.size.unwrap_or(0),
        uid: stat.uid.unwrap_or(0),
        gid: stat.gid.unwrap_or(0),
        permissions: perm,
        permissions_string: format_permissions(perm),
        atime: stat.atime,
        mtime: stat.mtime,
        kind,
    }
}

/// Compute a human-readable permissions string like "drwxr-xr-x".
pub fn format_permissions(mode: u32) -> String {
    let mut s = String::with_capacity(10);

    s.push(match mode & 0o170000 {
        0o040000 => 'd',
        0o120000 => 'l',
        0o010000 => 'p',
        0o140000 => 's',
        0o060000 => 'b',
        0o020000 => 'c',
        _ => '-',
    });

    for (shift, special, special_char) in [(6, 0o4000, 's'), (3, 0o2000, 's'), (0, 0o1000, 't')] {
        let bits = (mode >> shift) & 0o7;
        s.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        s.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        let exec = bits & 0o1 != 0;
        s.push(match (mode & special != 0, exec) {
            (true, true) => special_char,
            (true, false) => special_char.to_ascii_uppercase(),
            (false, true) => 'x',
            (false, false) => '-',
        });
    }

    s
}

/// Entry type from the `S_IFMT` bits of a mode.
pub fn entry_type_from_mode(mode: u32) -> SftpEntryType {
    match mode & 0o170000 {
        0o040000 => SftpEntryType::Directory,
        0o120000 => SftpEntryType::Symlink,
        0o060000 => SftpEntryType::BlockDevice,
        0o020000 => SftpEntryType::CharDevice,
        0o010000 => SftpEntryType::NamedPipe,
        0o140000 => SftpEntryType::Socket,
        0o100000 => SftpEntryType::File,
        _ => SftpEntryType::Unknown,
    }
}
