//! Filesystem helpers shared by every task.
//!
//! - [`write_if_changed`]: content-stable writes, so unchanged regenerations
//!   never bump mtimes or wake the watcher
//! - [`is_up_to_date`]: newer-than gate for copies and conversions
//! - [`relative_path`]: `../`-style path between two directories

use crate::log;
use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};
use walkdir::WalkDir;

/// Write `content` to `path` unless the file already holds exactly these bytes.
///
/// Returns `true` when a write happened. Read failures count as "absent". A
/// failed write is retried once; a second failure is logged and swallowed so
/// a watch tick never dies on it.
pub fn write_if_changed(path: &Path, content: impl AsRef<[u8]>) -> bool {
    let content = content.as_ref();

    if fs::read(path).is_ok_and(|existing| existing == content) {
        return false;
    }

    match write_with_parents(path, content).or_else(|_| write_with_parents(path, content)) {
        Ok(()) => true,
        Err(e) => {
            log!("write"; "{}: {e}", path.display());
            false
        }
    }
}

fn write_with_parents(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

/// Check whether `dst` exists and is at least as new as `src`.
pub fn is_up_to_date(src: &Path, dst: &Path) -> bool {
    let Ok(src_time) = src.metadata().and_then(|m| m.modified()) else {
        return false;
    };
    let Ok(dst_time) = dst.metadata().and_then(|m| m.modified()) else {
        return false;
    };
    src_time <= dst_time
}

/// Copy `src` to `dst` unless `dst` is up to date. Returns `true` if copied.
pub fn copy_if_newer(src: &Path, dst: &Path) -> io::Result<bool> {
    if is_up_to_date(src, dst) {
        return Ok(false);
    }
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dst)?;
    Ok(true)
}

/// Collect regular files under `dir`, sorted, skipping unreadable entries.
///
/// A missing directory yields an empty list.
pub fn collect_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Regular files directly inside `dir`, sorted. A missing directory yields
/// an empty list.
pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<_> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
        .map(|e| e.path())
        .collect();
    files.sort();
    files
}

/// Lowercased extension of `path`, empty when there is none.
pub fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Path of `path` relative to the directory `base`, using `..` as needed.
///
/// Both paths are compared component-wise, so they must share the same
/// anchoring (both absolute or both relative to the same root).
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path: Vec<Component> = path.components().filter(|c| *c != Component::CurDir).collect();
    let base: Vec<Component> = base.components().filter(|c| *c != Component::CurDir).collect();

    let common = path
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push("..");
    }
    for component in &path[common..] {
        rel.push(component.as_os_str());
    }
    rel
}

/// Forward-slash rendering of a path, for URLs and `@use` lines.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
