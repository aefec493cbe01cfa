//! Article catalog assembly.
//!
//! Pulls every entry from a [`ContentStore`], runs [`metadata::extract`] on
//! each, and returns the articles newest-first. The catalog is rebuilt from
//! scratch on every call: there is no cache and no incremental update path,
//! which keeps it trivially fresh for the handful of articles a personal site
//! carries.
//!
//! ## Failure policy
//!
//! | Problem | Effect |
//! |---------|--------|
//! | Store unavailable | whole build fails ([`StoreError`]) |
//! | Header invalid | entry dropped, diagnostic recorded |
//! | Slug already taken | later entry dropped, diagnostic recorded |
//! | Dangling image | entry kept with image cleared, diagnostic recorded |
//!
//! Diagnostics are logged at `warn` and returned in the [`CatalogReport`] so a
//! caller like `folio check` can show them; pages never see them.
//!
//! ## Ordering
//!
//! Sorted by `date` descending with a stable sort, so articles published on
//! the same day keep the store's discovery order.

use crate::config::SiteConfig;
use crate::metadata::{self, ArticleMetadata, AssetLookup, FsAssets, ValidationError};
use crate::store::{ContentStore, FsStore, StoreError};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// An article as consumed by pages: metadata plus its slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleWithSlug {
    pub slug: String,
    #[serde(flatten)]
    pub metadata: ArticleMetadata,
    /// Markdown body, rendered on the article page only.
    #[serde(skip)]
    pub body: String,
}

/// Articles sorted newest-first.
pub type ArticleCatalog = Vec<ArticleWithSlug>;

/// Why an entry was dropped or altered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("image {0:?} is not an existing asset; image cleared")]
    DanglingImage(String),
    #[error("slug {0:?} is already used by an earlier entry")]
    DuplicateSlug(String),
}

/// A per-entry problem recorded during a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub source: PathBuf,
    pub slug: String,
    pub problem: Problem,
}

impl Diagnostic {
    /// Whether the entry was left out of the catalog.
    pub fn excluded(&self) -> bool {
        !matches!(self.problem, Problem::DanglingImage(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogReport {
    pub articles: ArticleCatalog,
    pub diagnostics: Vec<Diagnostic>,
}

/// Build the catalog from every entry in `store`.
pub fn build_catalog(
    store: &dyn ContentStore,
    assets: &dyn AssetLookup,
) -> Result<CatalogReport, StoreError> {
    let entries = store.entries()?.collect::<Result<Vec<_>, _>>()?;

    // Extraction is pure per entry; collect() keeps discovery order.
    let results: Vec<_> = entries
        .par_iter()
        .map(|entry| metadata::extract(entry, assets))
        .collect();

    let mut seen = HashSet::new();
    let mut articles = Vec::with_capacity(entries.len());
    let mut diagnostics = Vec::new();

    for (entry, result) in entries.into_iter().zip(results) {
        let extracted = match result {
            Ok(extracted) => extracted,
            Err(err) => {
                record(&mut diagnostics, &entry.source, &entry.identifier, err.into());
                continue;
            }
        };

        if !seen.insert(entry.identifier.clone()) {
            let problem = Problem::DuplicateSlug(entry.identifier.clone());
            record(&mut diagnostics, &entry.source, &entry.identifier, problem);
            continue;
        }

        if let Some(dangling) = extracted.dangling_image {
            let problem = Problem::DanglingImage(dangling.reference);
            record(&mut diagnostics, &entry.source, &entry.identifier, problem);
        }

        articles.push(ArticleWithSlug {
            slug: entry.identifier,
            metadata: extracted.metadata,
            body: extracted.body,
        });
    }

    articles.sort_by(|a, b| b.metadata.date.cmp(&a.metadata.date));

    tracing::debug!(
        articles = articles.len(),
        diagnostics = diagnostics.len(),
        "catalog built"
    );
    Ok(CatalogReport {
        articles,
        diagnostics,
    })
}

fn record(diagnostics: &mut Vec<Diagnostic>, source: &Path, slug: &str, problem: Problem) {
    tracing::warn!(source = %source.display(), slug, %problem, "article problem");
    diagnostics.push(Diagnostic {
        source: source.to_path_buf(),
        slug: slug.to_string(),
        problem,
    });
}

/// Where pages get their articles from.
///
/// Holds the store and asset lookup; every call rebuilds the catalog.
#[derive(Debug, Clone)]
pub struct ArticleSource<S = FsStore, A = FsAssets> {
    store: S,
    assets: A,
}

impl ArticleSource {
    /// Filesystem source for a site rooted at `root`.
    pub fn from_config(root: &Path, config: &SiteConfig) -> Self {
        Self::new(
            FsStore::new(root.join(&config.content.articles_dir)),
            FsAssets::new(root.join(&config.content.assets_dir)),
        )
    }
}

impl<S: ContentStore, A: AssetLookup> ArticleSource<S, A> {
    pub fn new(store: S, assets: A) -> Self {
        Self { store, assets }
    }

    /// The full catalog, newest first. Diagnostics are logged and dropped.
    pub fn get_catalog(&self) -> Result<ArticleCatalog, StoreError> {
        Ok(self.build_report()?.articles)
    }

    /// The catalog together with every per-entry diagnostic.
    pub fn build_report(&self) -> Result<CatalogReport, StoreError> {
        build_catalog(&self.store, &self.assets)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }
}
