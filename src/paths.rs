//! Path normalization for external boundaries.
//!
//! Paths coming in from callers are made absolute and lexically cleaned
//! (`.` dropped, `..` folded) before use, and paths going out are rendered
//! with forward slashes. Neither step touches the filesystem beyond reading
//! the current directory, so they apply equally to paths that do not exist
//! yet, such as a fresh output directory.

use std::{
    io,
    path::{Component, Path, PathBuf},
};

/// Make `path` absolute and fold `.` and `..` components.
///
/// Relative paths are resolved against the current directory. `..` at the
/// root stays at the root. Symlinks are not resolved.
///
/// # Errors
///
/// Fails only if the current directory cannot be determined or `path` is
/// empty.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path.as_ref())?;
    Ok(clean(&absolute))
}

/// Render `path` with `/` separators.
pub fn display_path<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(cleaned.components().next_back(), Some(Component::Normal(_))) {
                    cleaned.pop();
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}
