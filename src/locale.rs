//! Locale configuration and resolution.
//!
//! A request's locale comes from one of three places, strongest first:
//!
//! 1. **Path prefix**: `/fr/about` is French, full stop. The resolved locale
//!    is marked *explicit*.
//! 2. **Language preferences**: the `Accept-Language` header, negotiated
//!    against the supported set.
//! 3. **Default locale**.
//!
//! [`LocaleConfig`] is built once at startup through a validating
//! constructor and passed explicitly to whatever needs it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleConfigError {
    #[error("at least one locale must be configured")]
    NoLocales,
    #[error("default locale {0:?} is not among the supported locales")]
    DefaultNotSupported(String),
    #[error("locale {0:?} must be a non-empty tag of letters, digits and dashes")]
    InvalidLocale(String),
    #[error("locale {0:?} is listed twice")]
    DuplicateLocale(String),
}

/// Whether the locale is reflected in visible URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocalePrefix {
    /// Every visible URL carries the locale.
    Always,
    /// Only non-default locales appear in visible URLs.
    AsNeeded,
    /// Visible URLs never carry the locale.
    Never,
}

/// Supported locales, the default, and the prefix policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleConfig {
    locales: Vec<String>,
    default_locale: String,
    prefix: LocalePrefix,
}

impl LocaleConfig {
    pub fn new(
        locales: Vec<String>,
        default_locale: &str,
        prefix: LocalePrefix,
    ) -> Result<Self, LocaleConfigError> {
        if locales.is_empty() {
            return Err(LocaleConfigError::NoLocales);
        }
        for (idx, locale) in locales.iter().enumerate() {
            let valid = !locale.is_empty()
                && locale.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
            if !valid {
                return Err(LocaleConfigError::InvalidLocale(locale.clone()));
            }
            if locales[..idx].contains(locale) {
                return Err(LocaleConfigError::DuplicateLocale(locale.clone()));
            }
        }
        if !locales.iter().any(|l| l == default_locale) {
            return Err(LocaleConfigError::DefaultNotSupported(
                default_locale.to_string(),
            ));
        }
        Ok(Self {
            locales,
            default_locale: default_locale.to_string(),
            prefix,
        })
    }

    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn prefix(&self) -> LocalePrefix {
        self.prefix
    }

    /// Exact-match lookup, returning the configured spelling.
    pub fn supported(&self, candidate: &str) -> Option<&str> {
        self.locales
            .iter()
            .find(|l| l.as_str() == candidate)
            .map(String::as_str)
    }

    /// The visible path for `path` in `locale`, honoring the prefix policy.
    ///
    /// `path` is an unprefixed absolute path (`/articles`).
    pub fn localized_path(&self, locale: &str, path: &str) -> String {
        let prefixed = match self.prefix {
            LocalePrefix::Always => true,
            LocalePrefix::AsNeeded => locale != self.default_locale,
            LocalePrefix::Never => false,
        };
        if prefixed {
            qualify(locale, path)
        } else {
            path.to_string()
        }
    }
}

/// `"/" + locale + path`, with `/` mapping to `/<locale>`.
pub fn qualify(locale: &str, path: &str) -> String {
    if path == "/" || path.is_empty() {
        format!("/{locale}")
    } else {
        format!("/{locale}{path}")
    }
}

/// Outcome of locale resolution for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLocale<'a> {
    pub locale: &'a str,
    /// The locale came from the path's leading segment.
    pub explicit: bool,
}

/// Resolve the locale for a request path and optional `Accept-Language`.
pub fn resolve<'a>(
    path: &str,
    accept_language: Option<&str>,
    config: &'a LocaleConfig,
) -> ResolvedLocale<'a> {
    if let Some(locale) = path_locale(path, config) {
        return ResolvedLocale {
            locale,
            explicit: true,
        };
    }

    let locale = accept_language
        .and_then(|header| negotiate(header, config))
        .unwrap_or(config.default_locale());
    ResolvedLocale {
        locale,
        explicit: false,
    }
}

/// The supported locale named by the path's leading segment, if any.
///
/// Matches `/<loc>` and `/<loc>/...` only; `/french` is not `/fr`.
pub fn path_locale<'a>(path: &str, config: &'a LocaleConfig) -> Option<&'a str> {
    let rest = path.strip_prefix('/')?;
    let segment = rest.split('/').next().unwrap_or_default();
    config.supported(segment)
}

/// One range from an `Accept-Language` header.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageRange {
    pub tag: String,
    pub quality: f32,
}

/// Parse an `Accept-Language` value, best first.
///
/// Ranges with `q=0`, malformed quality values or empty tags are dropped.
/// Equal qualities keep header order.
pub fn parse_accept_language(header: &str) -> Vec<LanguageRange> {
    let mut ranges: Vec<LanguageRange> = header
        .split(',')
        .filter_map(|item| {
            let mut parts = item.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            let mut quality = 1.0_f32;
            for param in parts {
                let param = param.trim();
                if let Some(value) = param.strip_prefix("q=").or_else(|| param.strip_prefix("Q=")) {
                    quality = value.trim().parse().ok()?;
                }
            }
            if !(quality > 0.0 && quality <= 1.0) {
                return None;
            }
            Some(LanguageRange {
                tag: tag.to_string(),
                quality,
            })
        })
        .collect();

    ranges.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    ranges
}

/// Pick the best supported locale for an `Accept-Language` value.
///
/// Each range, best first, tries an exact (case-insensitive) match and then
/// a primary-subtag match (`fr-CA` → `fr`). The wildcard `*` never matches.
pub fn negotiate<'a>(header: &str, config: &'a LocaleConfig) -> Option<&'a str> {
    parse_accept_language(header)
        .iter()
        .filter(|range| range.tag != "*")
        .find_map(|range| match_range(&range.tag, config))
}

fn match_range<'a>(tag: &str, config: &'a LocaleConfig) -> Option<&'a str> {
    let locales = config.locales();
    locales
        .iter()
        .find(|l| l.eq_ignore_ascii_case(tag))
        .or_else(|| {
            let primary = primary_subtag(tag);
            locales
                .iter()
                .find(|l| primary_subtag(l).eq_ignore_ascii_case(primary))
        })
        .map(String::as_str)
}

fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}
