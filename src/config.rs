//! Site configuration module.
//!
//! Handles loading and validating the site's `config.toml`. Stock defaults are
//! serialized to a TOML table and the user's file is merged on top, so config
//! files only need the keys they want to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "My Site"
//! author = ""
//! description = ""
//!
//! [content]
//! articles_dir = "articles"   # Article store root
//! assets_dir = "public"       # Static files; article images resolve here
//! pages_dir = "pages"         # profile.toml and about.md
//!
//! [i18n]
//! locales = ["en"]
//! default_locale = "en"
//! locale_prefix = "as-needed" # "always" | "as-needed" | "never"
//!
//! [routing]
//! excluded_prefixes = ["/api"] # Must cover /api
//! exclude_file_paths = true   # Skip paths whose last segment has a dot
//!
//! [server]
//! addr = "127.0.0.1:3000"
//! ```
//!
//! Configuration is read once at startup. Unknown keys are rejected to catch
//! typos early.

use crate::locale::{LocaleConfig, LocaleConfigError, LocalePrefix};
use crate::routing::{LocaleRouter, PathExclusion};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";

/// Mount point of the JSON endpoints. Always excluded from locale routing.
pub const API_PREFIX: &str = "/api";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Locale config error: {0}")]
    Locale(#[from] LocaleConfigError),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Identity shown in page titles and the header.
    pub site: SiteMeta,
    /// Where content lives, relative to the site root.
    pub content: ContentConfig,
    /// Supported locales and the prefix policy.
    pub i18n: I18nConfig,
    /// Paths that bypass locale routing.
    pub routing: RoutingConfig,
    /// HTTP listener settings.
    pub server: ServerConfig,
}

impl SiteConfig {
    /// Validate values that serde alone cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, dir) in [
            ("content.articles_dir", &self.content.articles_dir),
            ("content.assets_dir", &self.content.assets_dir),
            ("content.pages_dir", &self.content.pages_dir),
        ] {
            if dir.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        for prefix in &self.routing.excluded_prefixes {
            if !prefix.starts_with('/') || prefix.len() < 2 {
                return Err(ConfigError::Validation(format!(
                    "routing.excluded_prefixes entry {prefix:?} must start with '/' and name a segment"
                )));
            }
        }
        if !self.path_exclusion().matches(API_PREFIX) {
            return Err(ConfigError::Validation(format!(
                "routing.excluded_prefixes must cover {API_PREFIX}"
            )));
        }
        self.locale_config()?;
        Ok(())
    }

    /// Build the validated locale configuration.
    pub fn locale_config(&self) -> Result<LocaleConfig, LocaleConfigError> {
        LocaleConfig::new(
            self.i18n.locales.clone(),
            &self.i18n.default_locale,
            self.i18n.locale_prefix,
        )
    }

    pub fn path_exclusion(&self) -> PathExclusion {
        PathExclusion::new(
            self.routing.excluded_prefixes.clone(),
            self.routing.exclude_file_paths,
        )
    }

    /// The request router for this site.
    pub fn locale_router(&self) -> Result<LocaleRouter, ConfigError> {
        Ok(LocaleRouter::new(self.locale_config()?, self.path_exclusion()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub title: String,
    pub author: String,
    pub description: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "My Site".to_string(),
            author: String::new(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Article store root.
    pub articles_dir: String,
    /// Static files served as-is; article `image` references resolve here.
    pub assets_dir: String,
    /// Directory holding `profile.toml` and `about.md`.
    pub pages_dir: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            articles_dir: "articles".to_string(),
            assets_dir: "public".to_string(),
            pages_dir: "pages".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct I18nConfig {
    pub locales: Vec<String>,
    pub default_locale: String,
    pub locale_prefix: LocalePrefix,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            locales: vec!["en".to_string()],
            default_locale: "en".to_string(),
            locale_prefix: LocalePrefix::AsNeeded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingConfig {
    /// Path prefixes that skip locale handling (matched per segment).
    pub excluded_prefixes: Vec<String>,
    /// Skip paths whose final segment contains a dot (`/favicon.ico`).
    pub exclude_file_paths: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            excluded_prefixes: vec![API_PREFIX.to_string()],
            exclude_file_paths: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so a user's
///   `locales` list replaces the default list rather than extending it.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a site root as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the site config from `<root>/config.toml` over stock defaults.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let overlay = load_raw_config(root)?;
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# folio configuration
# ===================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
title = "My Site"
author = ""
description = ""

# ---------------------------------------------------------------------------
# Content locations, relative to the site root
# ---------------------------------------------------------------------------
[content]
# Markdown articles with YAML front matter. `hello.md` and `hello/index.md`
# both publish as /articles/hello.
articles_dir = "articles"

# Static files served as-is. Article `image:` values resolve against it.
assets_dir = "public"

# profile.toml (intro, roles, projects) and about.md.
pages_dir = "pages"

# ---------------------------------------------------------------------------
# Locales
# ---------------------------------------------------------------------------
[i18n]
locales = ["en"]
default_locale = "en"

# How the locale shows up in visible URLs:
#   "always"    - every URL carries it (/en/about)
#   "as-needed" - only non-default locales do (/about, /fr/about)
#   "never"     - no URL carries it; the locale is negotiated per request
locale_prefix = "as-needed"

# ---------------------------------------------------------------------------
# Routing
# ---------------------------------------------------------------------------
[routing]
# Paths under these prefixes bypass locale handling. Must cover /api,
# where the JSON endpoints live.
excluded_prefixes = ["/api"]

# Bypass locale handling for file-like paths (/favicon.ico, /cv.pdf).
exclude_file_paths = true

# ---------------------------------------------------------------------------
# Server
# ---------------------------------------------------------------------------
[server]
addr = "127.0.0.1:3000"
"##
}
