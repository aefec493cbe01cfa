//! Shared test utilities for the folio test suite.
//!
//! Provides in-memory stores and asset lookups, entry builders, and catalog
//! lookups that panic with a useful message on miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let report = build_catalog(
//!     &MemoryStore(vec![article_entry("hello", "2024-01-01")]),
//!     &KnownAssets::default(),
//! )
//! .unwrap();
//! assert_eq!(slugs(&report.articles), vec!["hello"]);
//!
//! let tmp = setup_fixtures();
//! let config = load_config(tmp.path()).unwrap();
//! ```

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::catalog::ArticleWithSlug;
use crate::metadata::{ArticleMetadata, AssetLookup, normalize_image_reference};
use crate::store::{ContentEntry, ContentStore, Entries, StoreError};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// In-memory collaborators
// =========================================================================

/// A store holding a fixed list of entries, yielded in order.
pub struct MemoryStore(pub Vec<ContentEntry>);

impl ContentStore for MemoryStore {
    fn entries(&self) -> Result<Entries<'_>, StoreError> {
        Ok(Box::new(self.0.iter().cloned().map(Ok)))
    }
}

/// A store whose root cannot be reached.
pub struct UnavailableStore;

impl ContentStore for UnavailableStore {
    fn entries(&self) -> Result<Entries<'_>, StoreError> {
        Err(StoreError::Unavailable {
            path: PathBuf::from("/nonexistent/articles"),
            source: io::Error::from(io::ErrorKind::NotFound),
        })
    }
}

/// Assets known by relative path (`images/a.jpg`).
#[derive(Default)]
pub struct KnownAssets(HashSet<String>);

impl KnownAssets {
    pub fn with(paths: &[&str]) -> Self {
        Self(paths.iter().map(|p| p.to_string()).collect())
    }
}

impl AssetLookup for KnownAssets {
    fn resolve_image(&self, reference: &str) -> Option<String> {
        let relative = normalize_image_reference(reference)?;
        self.0.contains(&relative).then(|| format!("/{relative}"))
    }
}

// =========================================================================
// Builders
// =========================================================================

/// Raw entry with the given identifier and contents.
pub fn entry(identifier: &str, raw_body: &str) -> ContentEntry {
    ContentEntry {
        identifier: identifier.to_string(),
        raw_body: raw_body.to_string(),
        source: PathBuf::from(format!("{identifier}.md")),
    }
}

/// Valid entry titled after its slug.
pub fn article_entry(slug: &str, date: &str) -> ContentEntry {
    article_entry_titled(slug, slug, date)
}

pub fn article_entry_titled(slug: &str, title: &str, date: &str) -> ContentEntry {
    entry(
        slug,
        &format!("---\ntitle: {title}\ndescription: About {slug}\ndate: {date}\n---\n\nBody of {slug}.\n"),
    )
}

/// Catalog article without going through extraction.
pub fn article(slug: &str, title: &str, date: &str) -> ArticleWithSlug {
    ArticleWithSlug {
        slug: slug.to_string(),
        metadata: ArticleMetadata {
            title: title.to_string(),
            description: format!("About {slug}"),
            date: date.parse().unwrap(),
            image: None,
            author: None,
        },
        body: String::new(),
    }
}

// =========================================================================
// Catalog lookups — panics with a clear message on miss
// =========================================================================

pub fn slugs(articles: &[ArticleWithSlug]) -> Vec<&str> {
    articles.iter().map(|a| a.slug.as_str()).collect()
}

/// Find an article by slug. Panics if not found.
pub fn find_article<'a>(articles: &'a [ArticleWithSlug], slug: &str) -> &'a ArticleWithSlug {
    articles.iter().find(|a| a.slug == slug).unwrap_or_else(|| {
        panic!("article '{slug}' not found. Available: {:?}", slugs(articles))
    })
}
