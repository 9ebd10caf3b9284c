//! Crash-safe file replacement: write a sibling temp file, fsync, rename over the target.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Replace the contents of `path` with `bytes` so that a reader never observes a
/// truncated file. Existing permissions of `path` are kept.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".xcplist-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    // NamedTempFile is created 0600; don't let that leak onto the target.
    match fs::metadata(path) {
        Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
        Err(_) => set_default_permissions(tmp.as_file())?,
    }

    tmp.persist(path).map_err(|e| e.error)?;
    log::trace!("replaced {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[cfg(unix)]
fn set_default_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_permissions(_file: &fs::File) -> io::Result<()> {
    Ok(())
}
