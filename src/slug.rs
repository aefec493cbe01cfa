//! Slug derivation for content entries.
//!
//! Every article is addressed by a slug derived from where it lives in the
//! content store, never from its title. Renaming an article's title keeps its
//! URL; moving the file changes it.
//!
//! ## Location → slug
//!
//! - `hello-world.md` → `hello-world`
//! - `hello-world/index.md` → `hello-world` (directory entry)
//! - `2024/Year in Review.md` → `2024-year-in-review`
//!
//! Path components are joined with dashes, lowercased, and sanitized so the
//! result is a single URL segment.

use std::path::{Component, Path};

const MAX_SLUG_LEN: usize = 80;

/// Slug used when sanitizing leaves nothing behind (e.g. `???.md`).
pub const FALLBACK_SLUG: &str = "article";

/// Derive a slug from a path relative to the content root.
///
/// The path should already have its extension removed (or point at the
/// entry's directory for `index.md`-style entries).
pub fn derive_slug(relative: &Path) -> String {
    let joined = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("-");

    let slug = sanitize_slug(&joined.to_lowercase());
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Sanitize a string for use as a single URL segment.
///
/// - Replaces characters outside `[A-Za-z0-9-]` with dashes
/// - Collapses consecutive dashes into one
/// - Strips leading and trailing dashes
/// - Truncates to `MAX_SLUG_LEN` characters (breaks at last dash before limit)
pub fn sanitize_slug(raw: &str) -> String {
    let mut collapsed = String::with_capacity(raw.len());
    let mut prev_dash = false;
    for c in raw.chars() {
        let c = if c.is_ascii_alphanumeric() { c } else { '-' };
        if c == '-' {
            if !prev_dash {
                collapsed.push('-');
            }
            prev_dash = true;
        } else {
            collapsed.push(c);
            prev_dash = false;
        }
    }

    let trimmed = collapsed.trim_matches('-');

    // All ASCII at this point, so byte slicing is safe.
    if trimmed.len() <= MAX_SLUG_LEN {
        trimmed.to_string()
    } else {
        let truncated = &trimmed[..MAX_SLUG_LEN];
        match truncated.rfind('-') {
            Some(pos) => truncated[..pos].to_string(),
            None => truncated.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn flat_file_stem() {
        assert_eq!(derive_slug(Path::new("hello-world")), "hello-world");
    }

    #[test]
    fn nested_components_joined_with_dash() {
        assert_eq!(derive_slug(Path::new("2024/recap")), "2024-recap");
    }

    #[test]
    fn spaces_and_case_normalized() {
        assert_eq!(
            derive_slug(Path::new("Year in Review")),
            "year-in-review"
        );
    }

    #[test]
    fn non_ascii_replaced() {
        assert_eq!(derive_slug(Path::new("café-crème")), "caf-cr-me");
    }

    #[test]
    fn empty_result_falls_back() {
        assert_eq!(derive_slug(Path::new("???")), FALLBACK_SLUG);
    }

    #[test]
    fn current_dir_components_ignored() {
        let p: PathBuf = ["."].iter().chain(["notes"].iter()).collect();
        assert_eq!(derive_slug(&p), "notes");
    }

    #[test]
    fn derivation_is_stable() {
        let p = Path::new("Some/Deep/Entry Name");
        assert_eq!(derive_slug(p), derive_slug(p));
    }

    #[test]
    fn sanitize_collapses_dashes() {
        assert_eq!(sanitize_slug("a---b"), "a-b");
        assert_eq!(sanitize_slug("a & b"), "a-b");
    }

    #[test]
    fn sanitize_strips_edges() {
        assert_eq!(sanitize_slug("--hello--"), "hello");
    }

    #[test]
    fn sanitize_truncates_at_word_boundary() {
        let long = "word-".repeat(30);
        let slug = sanitize_slug(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
        assert!(slug.ends_with("word"));
    }

    #[test]
    fn sanitize_truncates_without_dash() {
        let long = "a".repeat(100);
        assert_eq!(sanitize_slug(&long).len(), MAX_SLUG_LEN);
    }
}
