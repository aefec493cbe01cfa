//! Per-request locale routing decisions.
//!
//! Every inbound request goes through [`LocaleRouter::decide`] before any page
//! logic runs. The router makes one decision and keeps no state between
//! requests:
//!
//! ```text
//! path ──► Malformed? ──yes──► PassThrough
//!            │no
//!            ▼
//!          Excluded? ──yes──► PassThrough
//!            │no
//!            ▼
//!          Explicit locale prefix?
//!            ├─yes─► default locale + as-needed ─► RedirectTo(unprefixed, Permanent)
//!            │       otherwise ──────────────────► PassThrough
//!            └─no──► visible URL should carry the locale?
//!                      ├─yes─► RedirectTo(/<loc>/path, Temporary)
//!                      └─no──► RewriteTo(/<loc>/path)
//! ```
//!
//! Page handlers therefore always see a locale-qualified *logical* path.
//! Routing never fails: anything it cannot make sense of passes through
//! untouched.

use crate::locale::{self, LocaleConfig, LocalePrefix};
use serde::Serialize;

/// How a redirect should be reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RedirectKind {
    /// 308: canonical URL, cacheable, method preserved.
    Permanent,
    /// 307: depends on request preferences, method preserved.
    Temporary,
}

impl RedirectKind {
    pub fn status_code(self) -> u16 {
        match self {
            RedirectKind::Permanent => 308,
            RedirectKind::Temporary => 307,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RoutingDecision {
    /// Dispatch the request as-is.
    PassThrough,
    /// Dispatch under this path instead; the visible URL is unchanged.
    RewriteTo(String),
    /// Answer with a redirect to this path.
    RedirectTo(String, RedirectKind),
}

/// Which branch of the decision a request took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RouteState {
    Malformed,
    Excluded,
    Explicit,
    Implicit,
}

/// Paths that bypass locale handling entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExclusion {
    prefixes: Vec<String>,
    file_paths: bool,
}

impl PathExclusion {
    /// `prefixes` match whole segments (`/api` matches `/api` and `/api/x`,
    /// not `/apiary`). With `file_paths`, any path whose final segment
    /// contains a dot is excluded.
    pub fn new(prefixes: Vec<String>, file_paths: bool) -> Self {
        let prefixes = prefixes
            .into_iter()
            .map(|p| p.trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Self {
            prefixes,
            file_paths,
        }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn matches(&self, path: &str) -> bool {
        let under_prefix = self.prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        });
        let file_like = self.file_paths
            && path
                .rsplit('/')
                .next()
                .is_some_and(|segment| segment.contains('.'));
        under_prefix || file_like
    }
}

/// Locale routing for one site.
#[derive(Debug, Clone)]
pub struct LocaleRouter {
    locales: LocaleConfig,
    exclusion: PathExclusion,
}

impl LocaleRouter {
    pub fn new(locales: LocaleConfig, exclusion: PathExclusion) -> Self {
        Self { locales, exclusion }
    }

    pub fn locales(&self) -> &LocaleConfig {
        &self.locales
    }

    pub fn exclusion(&self) -> &PathExclusion {
        &self.exclusion
    }

    /// Decide what to do with a request.
    pub fn decide(&self, path: &str, accept_language: Option<&str>) -> RoutingDecision {
        let (state, decision) = self.evaluate(path, accept_language);
        tracing::debug!(path, ?state, ?decision, "routing decision");
        decision
    }

    /// The decision together with the branch that produced it.
    pub fn evaluate(
        &self,
        path: &str,
        accept_language: Option<&str>,
    ) -> (RouteState, RoutingDecision) {
        if is_malformed(path) {
            return (RouteState::Malformed, RoutingDecision::PassThrough);
        }
        if self.is_excluded(path) {
            return (RouteState::Excluded, RoutingDecision::PassThrough);
        }

        let resolved = locale::resolve(path, accept_language, &self.locales);
        let is_default = resolved.locale == self.locales.default_locale();

        if resolved.explicit {
            let decision = if is_default && self.locales.prefix() == LocalePrefix::AsNeeded {
                RoutingDecision::RedirectTo(
                    strip_locale(path, resolved.locale),
                    RedirectKind::Permanent,
                )
            } else {
                RoutingDecision::PassThrough
            };
            return (RouteState::Explicit, decision);
        }

        let logical = locale::qualify(resolved.locale, path);
        let visible_prefix = match self.locales.prefix() {
            LocalePrefix::Always => true,
            LocalePrefix::AsNeeded => !is_default,
            LocalePrefix::Never => false,
        };
        let decision = if visible_prefix {
            RoutingDecision::RedirectTo(logical, RedirectKind::Temporary)
        } else {
            RoutingDecision::RewriteTo(logical)
        };
        (RouteState::Implicit, decision)
    }

    /// Exclusion applies with or without a leading locale segment, so
    /// `/fr/api/ping` bypasses routing just like `/api/ping`.
    fn is_excluded(&self, path: &str) -> bool {
        if self.exclusion.matches(path) {
            return true;
        }
        match locale::path_locale(path, &self.locales) {
            Some(loc) => {
                let rest = strip_locale(path, loc);
                rest != "/" && self.exclusion.matches(&rest)
            }
            None => false,
        }
    }
}

/// Empty, relative, or containing an empty segment (`//`). The last would
/// let a stripped prefix turn into a protocol-relative redirect.
fn is_malformed(path: &str) -> bool {
    !path.starts_with('/') || path.contains("//")
}

/// `/en/about` → `/about`, `/en` and `/en/` → `/`.
fn strip_locale(path: &str, locale: &str) -> String {
    let rest = path.get(1 + locale.len()..).unwrap_or_default();
    if rest.is_empty() || rest == "/" {
        "/".to_string()
    } else {
        rest.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(prefix: LocalePrefix) -> LocaleRouter {
        let locales = LocaleConfig::new(vec!["en".into(), "fr".into()], "en", prefix).unwrap();
        let exclusion = PathExclusion::new(vec!["/api".into(), "/_next".into()], true);
        LocaleRouter::new(locales, exclusion)
    }

    fn rewrite(path: &str) -> RoutingDecision {
        RoutingDecision::RewriteTo(path.to_string())
    }

    fn redirect(path: &str, kind: RedirectKind) -> RoutingDecision {
        RoutingDecision::RedirectTo(path.to_string(), kind)
    }

    // =========================================================================
    // as-needed (the reference configuration)
    // =========================================================================

    #[test]
    fn implicit_default_rewrites() {
        let r = router(LocalePrefix::AsNeeded);
        assert_eq!(r.evaluate("/about", None), (RouteState::Implicit, rewrite("/en/about")));
    }

    #[test]
    fn root_rewrites_to_bare_locale() {
        let r = router(LocalePrefix::AsNeeded);
        assert_eq!(r.decide("/", None), rewrite("/en"));
    }

    #[test]
    fn explicit_non_default_passes() {
        let r = router(LocalePrefix::AsNeeded);
        assert_eq!(
            r.evaluate("/fr/about", None),
            (RouteState::Explicit, RoutingDecision::PassThrough)
        );
    }

    #[test]
    fn explicit_default_redirects_permanently() {
        let r = router(LocalePrefix::AsNeeded);
        assert_eq!(
            r.evaluate("/en/about", None),
            (RouteState::Explicit, redirect("/about", RedirectKind::Permanent))
        );
    }

    #[test]
    fn explicit_default_bare_redirects_to_root() {
        let r = router(LocalePrefix::AsNeeded);
        assert_eq!(r.decide("/en", None), redirect("/", RedirectKind::Permanent));
        assert_eq!(r.decide("/en/", None), redirect("/", RedirectKind::Permanent));
    }

    #[test]
    fn implicit_non_default_preference_redirects() {
        let r = router(LocalePrefix::AsNeeded);
        assert_eq!(
            r.decide("/about", Some("fr-CA,fr;q=0.9,en;q=0.8")),
            redirect("/fr/about", RedirectKind::Temporary)
        );
    }

    #[test]
    fn implicit_default_preference_rewrites() {
        let r = router(LocalePrefix::AsNeeded);
        assert_eq!(r.decide("/about", Some("en-GB")), rewrite("/en/about"));
    }

    #[test]
    fn unknown_segment_is_implicit() {
        let r = router(LocalePrefix::AsNeeded);
        assert_eq!(
            r.evaluate("/de/about", None),
            (RouteState::Implicit, rewrite("/en/de/about"))
        );
    }

    // =========================================================================
    // always / never
    // =========================================================================

    #[test]
    fn always_redirects_implicit() {
        let r = router(LocalePrefix::Always);
        assert_eq!(
            r.decide("/about", None),
            redirect("/en/about", RedirectKind::Temporary)
        );
    }

    #[test]
    fn always_passes_explicit_default() {
        let r = router(LocalePrefix::Always);
        assert_eq!(r.decide("/en/about", None), RoutingDecision::PassThrough);
    }

    #[test]
    fn never_rewrites_even_for_other_locale() {
        let r = router(LocalePrefix::Never);
        assert_eq!(r.decide("/about", Some("fr")), rewrite("/fr/about"));
    }

    #[test]
    fn never_passes_explicit() {
        let r = router(LocalePrefix::Never);
        assert_eq!(r.decide("/en/about", None), RoutingDecision::PassThrough);
    }

    // =========================================================================
    // Exclusions and malformed input
    // =========================================================================

    #[test]
    fn api_paths_pass_through() {
        let r = router(LocalePrefix::AsNeeded);
        assert_eq!(
            r.evaluate("/api/ping", Some("fr")),
            (RouteState::Excluded, RoutingDecision::PassThrough)
        );
        assert_eq!(r.decide("/api", None), RoutingDecision::PassThrough);
    }

    #[test]
    fn api_paths_pass_through_with_locale_prefix() {
        let r = router(LocalePrefix::AsNeeded);
        assert_eq!(r.decide("/en/api/ping", None), RoutingDecision::PassThrough);
        assert_eq!(r.decide("/fr/api/ping", None), RoutingDecision::PassThrough);
    }

    #[test]
    fn prefix_matches_whole_segments() {
        let r = router(LocalePrefix::AsNeeded);
        assert_eq!(r.decide("/apiary", None), rewrite("/en/apiary"));
    }

    #[test]
    fn framework_paths_pass_through() {
        let r = router(LocalePrefix::AsNeeded);
        assert_eq!(r.decide("/_next/static/chunk", None), RoutingDecision::PassThrough);
    }

    #[test]
    fn file_paths_pass_through() {
        let r = router(LocalePrefix::AsNeeded);
        assert_eq!(r.decide("/favicon.ico", None), RoutingDecision::PassThrough);
        assert_eq!(r.decide("/images/a.jpg", None), RoutingDecision::PassThrough);
        assert_eq!(r.decide("/en/cv.pdf", None), RoutingDecision::PassThrough);
    }

    #[test]
    fn dots_in_earlier_segments_do_not_exclude() {
        let r = router(LocalePrefix::AsNeeded);
        assert_eq!(r.decide("/v1.2/notes", None), rewrite("/en/v1.2/notes"));
    }

    #[test]
    fn file_path_exclusion_can_be_disabled() {
        let locales =
            LocaleConfig::new(vec!["en".into()], "en", LocalePrefix::AsNeeded).unwrap();
        let r = LocaleRouter::new(locales, PathExclusion::new(vec![], false));
        assert_eq!(r.decide("/favicon.ico", None), rewrite("/en/favicon.ico"));
    }

    #[test]
    fn malformed_paths_pass_through() {
        let r = router(LocalePrefix::AsNeeded);
        for path in ["", "about", "en/about", "//evil.example", "/en//evil.example"] {
            assert_eq!(
                r.evaluate(path, None),
                (RouteState::Malformed, RoutingDecision::PassThrough),
                "path {path:?}"
            );
        }
    }

    #[test]
    fn exclusion_prefix_trailing_slash_normalized() {
        let exclusion = PathExclusion::new(vec!["/internal/".into(), "/".into()], false);
        assert_eq!(exclusion.prefixes(), ["/internal".to_string()]);
        assert!(exclusion.matches("/internal/x"));
        assert!(!exclusion.matches("/about"));
    }

    #[test]
    fn redirect_status_codes() {
        assert_eq!(RedirectKind::Permanent.status_code(), 308);
        assert_eq!(RedirectKind::Temporary.status_code(), 307);
    }

    #[test]
    fn decisions_are_repeatable() {
        let r = router(LocalePrefix::AsNeeded);
        let paths = ["/", "/about", "/fr", "/en/articles", "/api/x", "bad"];
        for path in paths {
            assert_eq!(r.decide(path, Some("fr")), r.decide(path, Some("fr")));
        }
    }
}
