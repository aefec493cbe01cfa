//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every article is listed by its positional index and title, with the slug,
//! date and image as indented context lines. Diagnostics lead with the file
//! that caused them, relative to the articles directory, so a problem can be
//! traced back to the exact entry to fix.
//!
//! # Output Format
//!
//! ## Articles
//!
//! ```text
//! Articles
//! 001 Shipping v2
//!     Slug: shipping-v2
//!     Date: 2024-03-18
//!     Image: /images/shipping.jpg
//! 002 Hello, World
//!     Slug: hello-world
//!     Date: 2024-01-15
//! ```
//!
//! ## Check
//!
//! ```text
//! Diagnostics
//! 2023/year-in-review.md → 2023-year-in-review
//!     warning: image "/images/missing.jpg" is not an existing asset; image cleared
//! broken-header.md → broken-header
//!     excluded: malformed header: missing opening `---` fence
//!
//! 4 articles, 2 excluded, 1 warning
//! ```
//!
//! ## Route
//!
//! ```text
//! /about → rewrite /en/about
//! /en/about → redirect 308 /about
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::catalog::{ArticleWithSlug, CatalogReport, Diagnostic};
use crate::routing::RoutingDecision;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Articles
// ============================================================================

/// Format the catalog as an indexed list.
pub fn format_catalog(articles: &[ArticleWithSlug]) -> Vec<String> {
    let mut lines = vec!["Articles".to_string()];
    if articles.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }
    for (i, article) in articles.iter().enumerate() {
        let meta = &article.metadata;
        lines.push(format!("{} {}", format_index(i + 1), meta.title));
        lines.push(format!("{}Slug: {}", indent(1), article.slug));
        lines.push(format!("{}Date: {}", indent(1), meta.date));
        if let Some(image) = &meta.image {
            lines.push(format!("{}Image: {}", indent(1), image));
        }
        if !meta.description.is_empty() {
            lines.push(format!(
                "{}Description: {}",
                indent(1),
                truncate_desc(&meta.description, 60)
            ));
        }
    }
    lines
}

pub fn print_catalog(articles: &[ArticleWithSlug]) {
    for line in format_catalog(articles) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// One diagnostic: source file and slug, then the problem.
fn diagnostic_lines(diagnostic: &Diagnostic, articles_root: &Path) -> [String; 2] {
    let source = diagnostic
        .source
        .strip_prefix(articles_root)
        .unwrap_or(&diagnostic.source);
    let severity = if diagnostic.excluded() {
        "excluded"
    } else {
        "warning"
    };
    [
        format!("{} → {}", source.display(), diagnostic.slug),
        format!("{}{}: {}", indent(1), severity, diagnostic.problem),
    ]
}

/// Format a catalog build report: diagnostics followed by a summary line.
pub fn format_check_output(report: &CatalogReport, articles_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    if !report.diagnostics.is_empty() {
        lines.push("Diagnostics".to_string());
        for diagnostic in &report.diagnostics {
            lines.extend(diagnostic_lines(diagnostic, articles_root));
        }
        lines.push(String::new());
    }

    let excluded = report.diagnostics.iter().filter(|d| d.excluded()).count();
    let warnings = report.diagnostics.len() - excluded;
    lines.push(format!(
        "{}, {} excluded, {}",
        plural(report.articles.len(), "article"),
        excluded,
        plural(warnings, "warning")
    ));
    lines
}

pub fn print_check_output(report: &CatalogReport, articles_root: &Path) {
    for line in format_check_output(report, articles_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Route
// ============================================================================

/// Format a routing decision for a single path.
pub fn format_decision(path: &str, decision: &RoutingDecision) -> Vec<String> {
    let outcome = match decision {
        RoutingDecision::PassThrough => "pass through".to_string(),
        RoutingDecision::RewriteTo(target) => format!("rewrite {target}"),
        RoutingDecision::RedirectTo(target, kind) => {
            format!("redirect {} {}", kind.status_code(), target)
        }
    };
    vec![format!("{} → {}", path, outcome)]
}

pub fn print_decision(path: &str, decision: &RoutingDecision) {
    for line in format_decision(path, decision) {
        println!("{}", line);
    }
}
