//! # File I/O
//!
//! The only module that touches `std::fs`/`std::io` directly. A symlink or
//! directory path is refused outright (no following, no silent truncation
//! of directory contents), a bare `"-"` path means stdin/stdout, and
//! anything read is capped at [`crate::envelope::MAX_INPUT_SIZE`] before the
//! buffer that will hold it is even allocated.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::envelope::MAX_INPUT_SIZE;
use crate::error::{Error, Result};

/// Path mode a file is created with: secret keys get owner-only
/// read/write, everything else gets the platform default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileMode {
    Secret,
    Default,
}

/// Read the full contents of `path`, or stdin if `path == "-"`.
///
/// Refuses symlinks and directories; refuses input over
/// [`MAX_INPUT_SIZE`] without buffering it first.
pub fn read_all(path: &str) -> Result<Vec<u8>> {
    if path == "-" {
        return read_capped(&mut io::stdin());
    }

    let p = Path::new(path);
    let meta = fs::symlink_metadata(p).map_err(|e| Error::Io(format!("{path}: {e}")))?;
    if meta.file_type().is_symlink() {
        return Err(Error::Io(format!("{path}: refusing to follow a symlink")));
    }
    if meta.is_dir() {
        return Err(Error::Io(format!("{path}: is a directory")));
    }
    if meta.len() > MAX_INPUT_SIZE {
        return Err(Error::TooLarge);
    }

    let mut f = fs::File::open(p).map_err(|e| Error::Io(format!("{path}: {e}")))?;
    read_capped(&mut f)
}

fn read_capped<R: Read>(r: &mut R) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let read = r
        .take(MAX_INPUT_SIZE + 1)
        .read_to_end(&mut buf)
        .map_err(Error::from)?;
    if read as u64 > MAX_INPUT_SIZE {
        return Err(Error::TooLarge);
    }
    Ok(buf)
}

/// Write `bytes` to `path`, or stdout if `path == "-"`. `mode` controls the
/// permissions a newly created file gets. `excl` requests exclusive
/// creation (fails if the file already exists) — key generation uses this
/// so a `generate` never silently clobbers an existing key; other outputs
/// (signatures, ciphertexts) pass `false` and truncate an existing file.
pub fn write_all(path: &str, bytes: &[u8], mode: FileMode, excl: bool) -> Result<()> {
    if path == "-" {
        let mut stdout = io::stdout();
        stdout.write_all(bytes).map_err(Error::from)?;
        return stdout.flush().map_err(Error::from);
    }

    let p = Path::new(path);
    if let Ok(meta) = fs::symlink_metadata(p) {
        if meta.file_type().is_symlink() {
            return Err(Error::Io(format!("{path}: refusing to write through a symlink")));
        }
        if meta.is_dir() {
            return Err(Error::Io(format!("{path}: is a directory")));
        }
    }

    let mut opts = fs::OpenOptions::new();
    opts.write(true);
    if excl {
        opts.create_new(true);
    } else {
        opts.create(true).truncate(true);
    }
    #[cfg(unix)]
    if mode == FileMode::Secret {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut f = opts.open(p).map_err(|e| Error::Io(format!("{path}: {e}")))?;
    f.write_all(bytes).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("msg.txt");
        let path_str = path.to_str().unwrap();

        write_all(path_str, b"hello", FileMode::Default, false).unwrap();
        assert_eq!(read_all(path_str).unwrap(), b"hello");
    }

    #[test]
    fn refuses_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_all(dir.path().to_str().unwrap()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn secret_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.key");
        let path_str = path.to_str().unwrap();
        write_all(path_str, b"sekrit", FileMode::Secret, false).unwrap();

        let perms = fs::metadata(&path).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }

    #[test]
    fn exclusive_write_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seckey");
        let path_str = path.to_str().unwrap();

        write_all(path_str, b"first", FileMode::Secret, true).unwrap();
        assert!(write_all(path_str, b"second", FileMode::Secret, true).is_err());
        assert_eq!(read_all(path_str).unwrap(), b"first");
    }

    #[test]
    fn refuses_symlink() {
        #[cfg(unix)]
        {
            let dir = tempfile::tempdir().unwrap();
            let target = dir.path().join("real.txt");
            fs::write(&target, b"data").unwrap();
            let link = dir.path().join("link.txt");
            std::os::unix::fs::symlink(&target, &link).unwrap();
            assert!(read_all(link.to_str().unwrap()).is_err());
        }
    }
}
