//! Path validation
//!
//! Confines client-supplied relative paths to the served root.
//!
//! Resolution is purely lexical: the relative path is appended to the root,
//! `.` and `..` are collapsed, and the result must still lie inside the
//! root. Nothing here touches the filesystem, so symlinks inside the tree are
//! followed by whatever operation later opens the path.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::ConfinementError;

/// The single directory tree the server may read and write.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct ServedRoot {
    path: PathBuf,
}

impl ServedRoot {
    /// Canonicalize `dir` and check that it is an existing directory.
    pub fn new(dir: impl AsRef<Path>) -> io::Result<Self> {
        let path = dir.as_ref().canonicalize()?;
        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a directory",
            ));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve `relative` under the root. An empty path is the root itself.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, ConfinementError> {
        self.confine(join_lexical(&self.path, relative))
    }

    /// Resolve `name` as a sibling of an already resolved path.
    pub fn resolve_sibling(&self, resolved: &Path, name: &str) -> Result<PathBuf, ConfinementError> {
        let parent = resolved.parent().ok_or(ConfinementError)?;
        self.confine(join_lexical(parent, name))
    }

    /// Path of `resolved` relative to the root, `/`-separated.
    pub fn relative_of(&self, resolved: &Path) -> String {
        resolved
            .strip_prefix(&self.path)
            .map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default()
    }

    // Component-wise containment, so a sibling like `/srv-other` is not
    // mistaken for a child of `/srv`.
    fn confine(&self, cleaned: PathBuf) -> Result<PathBuf, ConfinementError> {
        if cleaned.starts_with(&self.path) {
            Ok(cleaned)
        } else {
            Err(ConfinementError)
        }
    }
}

/// Append `relative` to `base` and clean the result.
///
/// Root and drive components of `relative` are dropped so the join always
/// appends: `/etc` under `/srv` becomes `/srv/etc`.
fn join_lexical(base: &Path, relative: &str) -> PathBuf {
    let mut joined = base.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {}
            other => joined.push(other.as_os_str()),
        }
    }
    path_clean::clean(joined)
}
