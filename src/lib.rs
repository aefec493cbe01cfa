//! # folio
//!
//! A personal-site engine: a home page, an article index, a projects page and
//! an about page, served through locale-aware routing. Your filesystem is the
//! data source: markdown files with a YAML header become articles, and a
//! small `profile.toml` holds everything else.
//!
//! # Architecture: Two Cores
//!
//! Almost everything here is presentation glue. The two parts with real
//! logic are independent of each other:
//!
//! ```text
//! Content pipeline   articles/  →  entries  →  metadata  →  catalog (newest first)
//!                    store          metadata       catalog
//!
//! Locale routing     request path + Accept-Language  →  pass / rewrite / redirect
//!                    locale                             routing
//! ```
//!
//! The pipeline runs on demand: every page that lists articles rebuilds the
//! catalog from the store, so there is nothing to invalidate. Routing runs in
//! front of every HTTP request and makes one stateless decision.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | Walks the articles directory and yields raw entries |
//! | [`slug`] | Entry location → URL-safe, stable identifier |
//! | [`metadata`] | YAML header → validated `ArticleMetadata`; image reference lookup |
//! | [`catalog`] | Entries → de-duplicated, date-sorted catalog plus diagnostics |
//! | [`locale`] | Supported locales, prefix policy, `Accept-Language` negotiation |
//! | [`routing`] | Per-request pass-through / rewrite / redirect decision |
//! | [`config`] | `config.toml` loading over stock defaults, validation |
//! | [`profile`] | Intro, roles and projects from `profile.toml`; `about.md` |
//! | [`render`] | Shared Maud page renderer with per-page layouts |
//! | [`server`] | Axum app: routing middleware in front of page handlers |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Invalid Entries Never Break the Site
//!
//! A single article with a bad header is dropped and reported, not fatal. The
//! only error that fails a catalog build is an unreachable store. `folio
//! check` prints every dropped or altered entry with the reason.
//!
//! ## Locale Configuration Is a Value
//!
//! Supported locales, the default and the prefix policy are validated once at
//! startup into a `LocaleConfig` and handed to the router. Nothing reads
//! locale settings from global state.
//!
//! ## Which Paths Skip Routing Is Configuration
//!
//! API endpoints and file-like paths (`/favicon.ico`) bypass locale handling.
//! The prefixes and the file-path rule live under `[routing]` in
//! `config.toml`, because they depend on the hosting setup rather than on the
//! site itself.

pub mod catalog;
pub mod config;
pub mod locale;
pub mod logging;
pub mod metadata;
pub mod output;
pub mod profile;
pub mod render;
pub mod routing;
pub mod server;
pub mod slug;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
