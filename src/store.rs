//! Content store reader.
//!
//! Locates raw article entries under a root directory and yields them one at
//! a time. The store is read-only from folio's point of view: every call to
//! [`ContentStore::entries`] walks the root again, so re-reading an unchanged
//! store yields the same entries in the same order.
//!
//! ## Layout
//!
//! ```text
//! articles/                        # Store root ([content] articles_dir)
//! ├── hello-world.md               # Flat entry       → slug "hello-world"
//! ├── shipping-v2/                 # Directory entry  → slug "shipping-v2"
//! │   └── index.md
//! ├── 2024/
//! │   └── recap.mdx                # Nested entry     → slug "2024-recap"
//! ├── _drafts/                     # Skipped (leading underscore)
//! └── .obsidian/                   # Skipped (hidden)
//! ```
//!
//! Entries are visited in file-name order, which defines discovery order for
//! the catalog's stable tie-break.

use crate::slug::derive_slug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("content store unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One discovered unit of raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    /// URL-safe identifier derived from the entry's location.
    pub identifier: String,
    /// Full file contents, header included.
    pub raw_body: String,
    /// File the entry was read from.
    pub source: PathBuf,
}

/// Lazy sequence of entries. Store-level failures surface as `Err` items.
pub type Entries<'a> = Box<dyn Iterator<Item = Result<ContentEntry, StoreError>> + Send + 'a>;

/// A backing store of raw article entries.
pub trait ContentStore: Sync {
    /// Start a fresh pass over the store.
    ///
    /// Fails up front with [`StoreError::Unavailable`] if the root cannot be
    /// accessed at all.
    fn entries(&self) -> Result<Entries<'_>, StoreError>;
}

const ENTRY_EXTENSIONS: &[&str] = &["md", "markdown", "mdx"];
const DIRECTORY_ENTRY_STEMS: &[&str] = &["index", "page"];

/// Filesystem-backed store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentStore for FsStore {
    fn entries(&self) -> Result<Entries<'_>, StoreError> {
        let meta = fs::metadata(&self.root).map_err(|source| StoreError::Unavailable {
            path: self.root.clone(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(StoreError::Unavailable {
                path: self.root.clone(),
                source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            });
        }

        let root = self.root.as_path();
        let walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped(e));

        Ok(Box::new(walker.filter_map(move |item| match item {
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                Some(Err(StoreError::Unavailable {
                    path,
                    source: err.into(),
                }))
            }
            Ok(entry) if entry.file_type().is_file() && is_entry_file(entry.path()) => {
                Some(read_entry(root, entry.path()))
            }
            Ok(_) => None,
        })))
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name.starts_with('_')
}

fn is_entry_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| ENTRY_EXTENSIONS.contains(&ext.as_str()))
}

fn read_entry(root: &Path, path: &Path) -> Result<ContentEntry, StoreError> {
    let bytes = fs::read(path).map_err(|source| StoreError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ContentEntry {
        identifier: entry_identifier(root, path),
        raw_body: String::from_utf8_lossy(&bytes).into_owned(),
        source: path.to_path_buf(),
    })
}

/// Identifier for an entry file, relative to the store root.
///
/// `index.*` / `page.*` files name their parent directory; everything else
/// is named by its own path without extension.
fn entry_identifier(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match relative.parent() {
        Some(parent)
            if DIRECTORY_ENTRY_STEMS.contains(&stem.as_str())
                && !parent.as_os_str().is_empty() =>
        {
            derive_slug(parent)
        }
        _ => derive_slug(&relative.with_extension("")),
    }
}
