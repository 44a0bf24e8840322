//! Path-traversal-safe archive extraction.
//!
//! This is the one place where untrusted remote content becomes local
//! files. Every entry name is validated against the destination root
//! before anything is written; a single escaping entry aborts the
//! whole extraction.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Filesystem I/O failed (open, create, copy).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive itself is unreadable or corrupt.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An entry's stored name would resolve outside the destination
    /// directory. The extraction is aborted wholesale.
    #[error("Archive entry '{entry}' escapes the output directory")]
    PathTraversal { entry: String },
}

/// Extract a zip archive into `dest`, rejecting escaping entries.
///
/// All entry names are validated up front: if any entry's destination
/// would fall outside `dest` (absolute paths, `..` ascents), the
/// function fails with [`ArchiveError::PathTraversal`] before a single
/// byte is written. Directory entries are created recursively; file
/// entries are created, copied, and closed one at a time, with parent
/// directories created as needed. Re-running over the same archive
/// and destination overwrites in place.
///
/// Returns the extracted file paths relative to `dest` (directory
/// entries are not listed).
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<Vec<String>, ArchiveError> {
    let file = fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    // Pass 1: validate every entry name before touching the filesystem.
    let mut entries: Vec<(usize, PathBuf, bool, Option<u32>)> =
        Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        let relative = entry.enclosed_name().ok_or_else(|| ArchiveError::PathTraversal {
            entry: entry.name().to_string(),
        })?;
        entries.push((index, relative, entry.is_dir(), entry.unix_mode()));
    }

    // Pass 2: extract.
    let mut extracted = Vec::new();
    for (index, relative, is_dir, mode) in entries {
        let out_path = dest.join(&relative);

        if is_dir {
            fs::create_dir_all(&out_path)?;
            restore_mode(&out_path, mode)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut entry = archive.by_index(index)?;
        let mut out = fs::File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        drop(out);
        restore_mode(&out_path, mode)?;

        extracted.push(relative.to_string_lossy().into_owned());
    }

    Ok(extracted)
}

/// Restore an entry's stored unix mode on the extracted path.
///
/// A missing or all-zero mode is skipped: archives written on
/// non-unix systems carry none, and zero would make the file
/// unusable.
#[cfg(unix)]
fn restore_mode(path: &Path, mode: Option<u32>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    match mode {
        Some(mode) if mode & 0o777 != 0 => {
            fs::set_permissions(path, fs::Permissions::from_mode(mode))
        }
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
fn restore_mode(_path: &Path, _mode: Option<u32>) -> io::Result<()> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
