//! Capability-scoped filesystem helpers shared by the locality crates.
//!
//! Paths are UTF-8 (`camino`) and every operation goes through a `cap-std`
//! directory handle opened with ambient authority at the call site.
#![forbid(unsafe_code)]

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io;
use std::process;

/// Open an existing UTF-8 file path for reading.
///
/// # Errors
///
/// Returns the underlying I/O error when the file cannot be opened.
pub fn open_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Open the directory containing `path` and return it with the file name.
///
/// # Errors
///
/// Fails when `path` has no file name or the parent cannot be opened.
pub fn open_parent_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("path {path} has no file name")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Create every missing ancestor directory of `path`.
///
/// # Errors
///
/// Returns the I/O error raised while creating a directory.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base_dir, relative) = split_base_dir(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

/// Report whether `path` exists and is a regular file.
///
/// # Errors
///
/// Returns `NotFound` when `path` or its parent is missing, and any other
/// metadata error unchanged.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent_dir(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Replace the contents of `path` with `contents` in one step.
///
/// The bytes are written to a hidden sibling first and renamed over the
/// destination, so readers never observe a half-written file. Missing parent
/// directories are created.
///
/// # Errors
///
/// Returns the I/O error from directory creation, the write, or the rename.
/// The temporary sibling is removed on a failed rename.
pub fn write_file_atomically(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_parent_dir(path)?;
    let staging = format!(".{name}.{}.tmp", process::id());
    dir.write(staging.as_str(), contents)?;
    if let Err(err) = dir.rename(staging.as_str(), &dir, name.as_str()) {
        if let Err(cleanup) = dir.remove_file(staging.as_str()) {
            return Err(io::Error::new(
                err.kind(),
                format!("{err}; removing {staging} also failed: {cleanup}"),
            ));
        }
        return Err(err);
    }
    Ok(())
}

/// Open the root (or `.` for relative paths) of `dir` and return it with the
/// remaining components.
fn split_base_dir(dir: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let mut components = dir.components().peekable();
    let mut base = Utf8PathBuf::new();
    while let Some(anchor) = components.next_if(|component| {
        matches!(component, Utf8Component::Prefix(_) | Utf8Component::RootDir)
    }) {
        base.push(anchor);
    }
    if base.as_str().is_empty() {
        base.push(".");
    }
    let relative: Utf8PathBuf = components.collect();
    let handle = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    Ok((handle, relative))
}
