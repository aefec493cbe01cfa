//! Article metadata extraction and validation.
//!
//! Every article starts with a YAML front matter block:
//!
//! ```text
//! ---
//! title: Shipping v2
//! description: What changed, and what we learned.
//! date: 2024-03-18
//! image: /images/shipping.jpg      # optional, must exist under assets_dir
//! author: Jane Doe                 # optional
//! ---
//!
//! Markdown body…
//! ```
//!
//! ## Validation order
//!
//! Rules are checked in order and the first failure wins:
//!
//! 1. The header block is present, closed, and a key/value map
//!    ([`ValidationError::MalformedHeader`]).
//! 2. `title` then `description` are present and non-empty
//!    ([`ValidationError::MissingField`]).
//! 3. `date` is present ([`ValidationError::MissingField`]) and parses as a
//!    calendar date ([`ValidationError::InvalidDate`]). Both `2024-03-18` and
//!    RFC 3339 timestamps are accepted; only the date part is kept.
//! 4. `image`, if present, resolves to an existing visual asset. A dangling
//!    reference is not an error: the image is cleared and reported through
//!    [`Extracted::dangling_image`].
//!
//! Scalar values are stringified (`title: 2024` is the title `"2024"`);
//! sequences and maps count as absent.

use crate::store::ContentEntry;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid date {0:?}")]
    InvalidDate(String),
}

/// Validated article header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub title: String,
    pub description: String,
    /// Publication date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Public URL path of the cover image (e.g. `/images/cover.jpg`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// An `image` reference that did not resolve to an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingImage {
    pub reference: String,
}

/// Result of extracting one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub metadata: ArticleMetadata,
    /// Markdown following the header block.
    pub body: String,
    /// Set when the header named an image that could not be resolved.
    pub dangling_image: Option<DanglingImage>,
}

/// Lookup of visual assets referenced from article headers.
pub trait AssetLookup: Sync {
    /// Resolve a header `image` value to its public URL path, or `None` if
    /// it does not name an existing visual asset.
    fn resolve_image(&self, reference: &str) -> Option<String>;
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "svg", "avif"];

/// Assets served from a directory (`[content] assets_dir`).
///
/// `/images/a.jpg` and `images/a.jpg` both resolve to `<root>/images/a.jpg`
/// and are published as `/images/a.jpg`.
#[derive(Debug, Clone)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLookup for FsAssets {
    fn resolve_image(&self, reference: &str) -> Option<String> {
        let relative = normalize_image_reference(reference)?;
        self.root
            .join(&relative)
            .is_file()
            .then(|| format!("/{relative}"))
    }
}

/// Normalize an image reference to a root-relative path.
///
/// Rejects remote URLs, empty or `..` segments, and non-image extensions.
pub fn normalize_image_reference(reference: &str) -> Option<String> {
    let trimmed = reference.trim();
    if trimmed.contains("://") || trimmed.starts_with("//") {
        return None;
    }
    let relative = trimmed.trim_start_matches('/');
    if relative.is_empty() || relative.split('/').any(|seg| seg.is_empty() || seg == "..") {
        return None;
    }
    let ext = Path::new(relative)
        .extension()?
        .to_string_lossy()
        .to_lowercase();
    IMAGE_EXTENSIONS
        .contains(&ext.as_str())
        .then(|| relative.to_string())
}

/// Extract and validate the header of one content entry.
pub fn extract(entry: &ContentEntry, assets: &dyn AssetLookup) -> Result<Extracted, ValidationError> {
    let (header, body) = split_header(&entry.raw_body)?;
    let fields = parse_header(header)?;

    let title = scalar_field(&fields, "title").ok_or(ValidationError::MissingField("title"))?;
    let description =
        scalar_field(&fields, "description").ok_or(ValidationError::MissingField("description"))?;

    let raw_date = scalar_field(&fields, "date").ok_or(ValidationError::MissingField("date"))?;
    let date = parse_date(&raw_date).ok_or(ValidationError::InvalidDate(raw_date))?;

    let (image, dangling_image) = match scalar_field(&fields, "image") {
        Some(reference) => match assets.resolve_image(&reference) {
            Some(url) => (Some(url), None),
            None => (None, Some(DanglingImage { reference })),
        },
        None => (None, None),
    };

    Ok(Extracted {
        metadata: ArticleMetadata {
            title,
            description,
            date,
            image,
            author: scalar_field(&fields, "author"),
        },
        body: body.trim_start_matches(['\r', '\n']).to_string(),
        dangling_image,
    })
}

/// Split raw content into `(header, body)` around the `---` fences.
fn split_header(raw: &str) -> Result<(&str, &str), ValidationError> {
    let text = raw.trim_start_matches('\u{feff}');
    let mut lines = text.split_inclusive('\n');
    let mut offset = 0;

    let mut opened = false;
    for line in lines.by_ref() {
        offset += line.len();
        if line.trim().is_empty() {
            continue;
        }
        opened = line.trim_end() == "---";
        break;
    }
    if !opened {
        return Err(ValidationError::MalformedHeader(
            "content must start with a `---` front matter block".into(),
        ));
    }

    let header_start = offset;
    for line in lines {
        if line.trim_end() == "---" {
            let header = &text[header_start..offset];
            let body = &text[offset + line.len()..];
            return Ok((header, body));
        }
        offset += line.len();
    }

    Err(ValidationError::MalformedHeader(
        "front matter block is not closed".into(),
    ))
}

fn parse_header(header: &str) -> Result<Mapping, ValidationError> {
    let value: Value = serde_yaml::from_str(header)
        .map_err(|err| ValidationError::MalformedHeader(err.to_string()))?;
    match value {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(ValidationError::MalformedHeader(
            "front matter must be key/value pairs".into(),
        )),
    }
}

fn scalar_field(fields: &Mapping, key: &str) -> Option<String> {
    let raw = match fields.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!raw.is_empty()).then_some(raw)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}
