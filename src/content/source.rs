//! File-system access for the content indexer
//!
//! The indexer only ever needs three things from storage: list a directory,
//! read a file and stat a file. [`ContentSource`] captures exactly that, so
//! the on-disk tree can be swapped for an in-memory one in tests.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// Errors raised while reading from a content source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read file {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// A single entry returned by [`ContentSource::read_dir`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Dir,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Read-only view of a content tree
pub trait ContentSource {
    /// List the direct children of `dir`
    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>, SourceError>;

    /// Read a UTF-8 file
    fn read_to_string(&self, path: &Path) -> Result<String, SourceError>;

    /// Modification time, if the source tracks one
    fn modified(&self, path: &Path) -> Option<SystemTime>;
}

impl<T: ContentSource + ?Sized> ContentSource for &T {
    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>, SourceError> {
        (**self).read_dir(dir)
    }

    fn read_to_string(&self, path: &Path) -> Result<String, SourceError> {
        (**self).read_to_string(path)
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        (**self).modified(path)
    }
}

/// The real file system
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskSource;

impl ContentSource for DiskSource {
    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>, SourceError> {
        let read_err = |source| SourceError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::debug!("Skipping non UTF-8 entry {:?} in {:?}", raw, dir);
                    continue;
                }
            };

            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!("Failed to stat {:?}: {}", entry.path(), e);
                    continue;
                }
            };

            let kind = if file_type.is_dir() {
                EntryKind::Dir
            } else if file_type.is_file() {
                EntryKind::File
            } else if file_type.is_symlink() {
                // Symlinked files are followed, symlinked directories are not,
                // so the walk can never loop.
                match fs::metadata(entry.path()) {
                    Ok(meta) if meta.is_file() => EntryKind::File,
                    _ => continue,
                }
            } else {
                continue;
            };

            entries.push(DirEntry { name, kind });
        }

        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> Result<String, SourceError> {
        fs::read_to_string(path).map_err(|source| SourceError::ReadFile {
            path: path.to_path_buf(),
            source,
        })
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        fs::metadata(path).and_then(|m| m.modified()).ok()
    }
}

#[derive(Debug, Clone)]
struct MemoryFile {
    content: String,
    modified: Option<SystemTime>,
}

/// In-memory content tree, mostly for tests
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, MemoryFile>,
    dirs: BTreeSet<PathBuf>,
    unreadable: BTreeSet<PathBuf>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent directories implicitly
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content, None);
        self
    }

    /// Add a file with a fixed modification time
    pub fn with_file_modified(
        mut self,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
        modified: SystemTime,
    ) -> Self {
        self.insert(path, content, Some(modified));
        self
    }

    /// Add an empty directory
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dirs.insert(path.into());
        self
    }

    /// Make `read_dir` fail for this directory
    pub fn with_unreadable_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.dirs.insert(path.clone());
        self.unreadable.insert(path);
        self
    }

    fn insert(
        &mut self,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
        modified: Option<SystemTime>,
    ) {
        self.files.insert(
            path.into(),
            MemoryFile {
                content: content.into(),
                modified,
            },
        );
    }

    fn all_paths(&self) -> impl Iterator<Item = (&PathBuf, EntryKind)> {
        self.files
            .keys()
            .map(|p| (p, EntryKind::File))
            .chain(self.dirs.iter().map(|p| (p, EntryKind::Dir)))
    }
}

impl ContentSource for MemorySource {
    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>, SourceError> {
        if self.unreadable.contains(dir) {
            return Err(SourceError::ReadDir {
                path: dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
            });
        }

        let mut known = self.dirs.contains(dir);
        let mut children: BTreeMap<String, EntryKind> = BTreeMap::new();

        for (path, kind) in self.all_paths() {
            let Ok(rest) = path.strip_prefix(dir) else {
                continue;
            };
            let mut components = rest.components();
            let Some(first) = components.next() else {
                continue;
            };
            known = true;

            let name = first.as_os_str().to_string_lossy().into_owned();
            let kind = if components.next().is_some() {
                EntryKind::Dir
            } else {
                kind
            };
            children
                .entry(name)
                .and_modify(|k| {
                    if kind == EntryKind::Dir {
                        *k = EntryKind::Dir;
                    }
                })
                .or_insert(kind);
        }

        if !known {
            return Err(SourceError::ReadDir {
                path: dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such directory"),
            });
        }

        Ok(children
            .into_iter()
            .map(|(name, kind)| DirEntry { name, kind })
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> Result<String, SourceError> {
        self.files
            .get(path)
            .map(|f| f.content.clone())
            .ok_or_else(|| SourceError::ReadFile {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
            })
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        self.files.get(path).and_then(|f| f.modified)
    }
}
