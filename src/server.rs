//! HTTP hosting.
//!
//! The locale router sits in front of everything. It wraps the page router as
//! a whole (not as a per-route layer) so a rewrite changes which route
//! matches:
//!
//! ```text
//! request ─► TraceLayer ─► trim trailing `/` ─► locale_routing ─┬─ PassThrough ─────────────┐
//!                                                               ├─ RewriteTo(p): uri.path=p ┤─► pages
//!                                                               └─ RedirectTo: 307 / 308    │
//!                                                                                           ▼
//!     /api/health, /api/articles
//!     /<locale>, /<locale>/articles[/:slug], /<locale>/projects, /<locale>/about
//!     anything else: static files from the assets directory
//! ```
//!
//! Page routes exist only for configured locales, so `/de/about` on an
//! English and French site falls through to the static files and ends in a
//! 404. Page handlers only ever see logical (locale-qualified) paths. Every
//! page request rebuilds the catalog on the blocking pool, so edits to
//! content show up without a restart.

use crate::catalog::{ArticleCatalog, ArticleSource};
use crate::config::{API_PREFIX, ConfigError, SiteConfig};
use crate::locale;
use crate::profile::{self, Profile, ProfileError};
use crate::render::{
    AboutLayout, ArticleLayout, ArticlesLayout, ErrorLayout, HomeLayout, PageContext, ProjectsLayout,
    render_page,
};
use crate::routing::{LocaleRouter, RedirectKind, RoutingDecision};
use crate::store::StoreError;
use axum::extract::{Path, Request, State};
use axum::handler::Handler;
use axum::http::uri::PathAndQuery;
use axum::http::{HeaderValue, StatusCode, Uri, header};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Router};
use maud::Markup;
use std::net::SocketAddr;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Everything a request needs. Immutable after startup.
#[derive(Debug)]
pub struct AppState {
    pub config: SiteConfig,
    pub router: LocaleRouter,
    pub articles: ArticleSource,
    pub pages_dir: PathBuf,
    pub assets_dir: PathBuf,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Resolve content directories against the site root.
    pub fn new(root: &FsPath, config: SiteConfig) -> Result<Self, ConfigError> {
        let router = config.locale_router()?;
        let articles = ArticleSource::from_config(root, &config);
        let pages_dir = root.join(&config.content.pages_dir);
        let assets_dir = root.join(&config.content.assets_dir);
        Ok(Self {
            config,
            router,
            articles,
            pages_dir,
            assets_dir,
        })
    }

    fn context<'a>(&'a self, locale: &'a str, path: &'a str) -> PageContext<'a> {
        PageContext {
            site: &self.config.site,
            locales: self.router.locales(),
            locale,
            path,
        }
    }
}

/// Build the application service.
pub fn app(state: SharedState) -> Router {
    let not_found = not_found_page.with_state(state.clone());
    let mut pages = Router::new()
        .route(&format!("{API_PREFIX}/health"), get(|| async { "ok\n" }))
        .route(&format!("{API_PREFIX}/articles"), get(api_articles));
    for locale in state.router.locales().locales() {
        pages = pages.nest(&format!("/{locale}"), locale_pages(locale));
    }
    let pages = pages
        .fallback_service(ServeDir::new(&state.assets_dir).not_found_service(not_found))
        .with_state(state.clone());

    let routed = middleware::from_fn_with_state(state, locale_routing).layer(pages);
    // `/fr/` and `/articles/` must reach the same routes as their slash-less forms.
    let routed = NormalizePathLayer::trim_trailing_slash().layer(routed);
    Router::new()
        .fallback_service(routed)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app(Arc::new(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

// ============================================================================
// Locale routing middleware
// ============================================================================

async fn locale_routing(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Response {
    let accept_language = request
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());
    let decision = state.router.decide(request.uri().path(), accept_language);

    match decision {
        RoutingDecision::PassThrough => next.run(request).await,
        RoutingDecision::RewriteTo(path) => {
            match with_path(request.uri(), &path) {
                Some(uri) => *request.uri_mut() = uri,
                None => tracing::warn!(%path, "cannot rewrite request uri"),
            }
            let mut response = next.run(request).await;
            response
                .headers_mut()
                .append(header::VARY, HeaderValue::from_static("accept-language"));
            response
        }
        RoutingDecision::RedirectTo(path, kind) => {
            let location = match request.uri().query() {
                Some(query) => format!("{path}?{query}"),
                None => path,
            };
            match kind {
                RedirectKind::Permanent => Redirect::permanent(&location).into_response(),
                RedirectKind::Temporary => {
                    let mut response = Redirect::temporary(&location).into_response();
                    response
                        .headers_mut()
                        .append(header::VARY, HeaderValue::from_static("accept-language"));
                    response
                }
            }
        }
    }
}

/// `uri` with its path replaced, query kept.
fn with_path(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}

// ============================================================================
// Pages
// ============================================================================

#[derive(Error, Debug)]
enum PageError {
    #[error("page not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl PageError {
    fn status(&self) -> StatusCode {
        match self {
            PageError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Locale a nested page router serves.
#[derive(Debug, Clone)]
struct PageLocale(String);

fn locale_pages(locale: &str) -> Router<SharedState> {
    Router::new()
        .route("/", get(home))
        .route("/articles", get(articles))
        .route("/articles/:slug", get(article))
        .route("/projects", get(projects))
        .route("/about", get(about))
        .layer(Extension(PageLocale(locale.to_string())))
}

enum Page {
    Home,
    Articles,
    Article(String),
    Projects,
    About,
}

impl Page {
    /// Unprefixed path of the page.
    fn path(&self) -> String {
        match self {
            Page::Home => "/".to_string(),
            Page::Articles => "/articles".to_string(),
            Page::Article(slug) => format!("/articles/{slug}"),
            Page::Projects => "/projects".to_string(),
            Page::About => "/about".to_string(),
        }
    }
}

async fn home(
    State(state): State<SharedState>,
    Extension(locale): Extension<PageLocale>,
) -> Response {
    respond(state, locale, Page::Home).await
}

async fn articles(
    State(state): State<SharedState>,
    Extension(locale): Extension<PageLocale>,
) -> Response {
    respond(state, locale, Page::Articles).await
}

async fn article(
    State(state): State<SharedState>,
    Extension(locale): Extension<PageLocale>,
    Path(slug): Path<String>,
) -> Response {
    respond(state, locale, Page::Article(slug)).await
}

async fn projects(
    State(state): State<SharedState>,
    Extension(locale): Extension<PageLocale>,
) -> Response {
    respond(state, locale, Page::Projects).await
}

async fn about(
    State(state): State<SharedState>,
    Extension(locale): Extension<PageLocale>,
) -> Response {
    respond(state, locale, Page::About).await
}

async fn respond(state: SharedState, PageLocale(locale): PageLocale, page: Page) -> Response {
    let path = page.path();
    match render(&state, &locale, &path, &page).await {
        Ok(markup) => Html(markup.into_string()).into_response(),
        Err(err) => error_page(&state, &locale, &path, err),
    }
}

async fn render(
    state: &SharedState,
    locale: &str,
    path: &str,
    page: &Page,
) -> Result<Markup, PageError> {
    let ctx = state.context(locale, path);
    let markup = match page {
        Page::Home => {
            let catalog = load_catalog(state).await?;
            let profile = load_profile(state).await?;
            render_page(&HomeLayout { profile: &profile }, &ctx, &catalog)
        }
        Page::Articles => {
            let catalog = load_catalog(state).await?;
            render_page(&ArticlesLayout, &ctx, &catalog)
        }
        Page::Article(slug) => {
            let catalog = load_catalog(state).await?;
            let article = catalog
                .iter()
                .find(|a| a.slug == *slug)
                .ok_or(PageError::NotFound)?;
            render_page(&ArticleLayout { article }, &ctx, &catalog)
        }
        Page::Projects => {
            let profile = load_profile(state).await?;
            render_page(
                &ProjectsLayout {
                    projects: &profile.projects,
                },
                &ctx,
                &[],
            )
        }
        Page::About => {
            let profile = load_profile(state).await?;
            render_page(&AboutLayout { profile: &profile }, &ctx, &[])
        }
    };
    Ok(markup)
}

async fn load_catalog(state: &SharedState) -> Result<ArticleCatalog, PageError> {
    let state = Arc::clone(state);
    Ok(tokio::task::spawn_blocking(move || state.articles.get_catalog()).await??)
}

async fn load_profile(state: &SharedState) -> Result<Profile, PageError> {
    let state = Arc::clone(state);
    Ok(tokio::task::spawn_blocking(move || profile::load_profile(&state.pages_dir)).await??)
}

fn error_page(state: &AppState, locale: &str, path: &str, err: PageError) -> Response {
    let status = err.status();
    let message = match err {
        PageError::NotFound => {
            tracing::debug!(path, "not found");
            "Page not found."
        }
        _ => {
            tracing::error!(path, error = %err, "page failed");
            "Something went wrong."
        }
    };
    let locales = state.router.locales();
    let locale = locales
        .supported(locale)
        .unwrap_or(locales.default_locale());
    let layout = ErrorLayout {
        status: status.as_u16(),
        message,
    };
    let markup = render_page(&layout, &state.context(locale, "/"), &[]);
    (status, Html(markup.into_string())).into_response()
}

async fn not_found_page(State(state): State<SharedState>, uri: Uri) -> Response {
    let locales = state.router.locales();
    let locale = locale::path_locale(uri.path(), locales).unwrap_or(locales.default_locale());
    error_page(&state, locale, uri.path(), PageError::NotFound)
}

// ============================================================================
// API
// ============================================================================

async fn api_articles(
    State(state): State<SharedState>,
) -> Result<Json<ArticleCatalog>, (StatusCode, String)> {
    load_catalog(&state).await.map(Json).map_err(|err| {
        tracing::error!(error = %err, "catalog build failed");
        (err.status(), err.to_string())
    })
}
