use std::{fs, io::Write, path::{Path, PathBuf}};

use crate::errors::TuneError;

/// Directory a file will be written into, "." for bare file names
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Mode the replacement should carry: the target's current one, or a
/// regular 0644 for new files
fn target_permissions(path: &Path) -> Option<fs::Permissions> {
    match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_permissions(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// Replaces `path` in full with `bytes` through a temp file in the same
/// directory, readers see either the old or the new content
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), TuneError> {
    let parent = parent_dir(path);
    fs::create_dir_all(&parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(&parent)?;
    temp.write_all(bytes)?;
    // temp files are created owner-only
    if let Some(perms) = target_permissions(path) {
        temp.as_file().set_permissions(perms)?;
    }
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
