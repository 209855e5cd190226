//! SSH credential installation.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

const AUTHORIZED_KEYS: &str = "authorized_keys";

/// Write `public_key` as the only entry of `{ssh_dir}/authorized_keys`.
///
/// The directory ends up `0700` and the file `0600`; the file is renamed into
/// place so the daemon never reads a half-written key.
pub fn install_authorized_key(ssh_dir: &Path, public_key: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(ssh_dir)?;
    set_mode(ssh_dir, 0o700)?;

    let mut staged = NamedTempFile::new_in(ssh_dir)?;
    writeln!(staged, "{}", public_key.trim())?;
    staged.as_file().sync_all()?;
    set_mode(staged.path(), 0o600)?;

    let target = ssh_dir.join(AUTHORIZED_KEYS);
    staged.persist(&target).map_err(|e| e.error)?;
    Ok(target)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
