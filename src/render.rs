//! HTML rendering.
//!
//! All pages go through one renderer, [`render_page`], which owns the
//! document shell, the header, the navigation and the locale switcher. What
//! differs per page is supplied by a [`PageLayout`] implementation:
//!
//! | Layout | Visible path | Content |
//! |---|---|---|
//! | [`HomeLayout`] | `/` | intro, latest articles, role history |
//! | [`ArticlesLayout`] | `/articles` | every article card |
//! | [`ArticleLayout`] | `/articles/{slug}` | one article body |
//! | [`ProjectsLayout`] | `/projects` | project list |
//! | [`AboutLayout`] | `/about` | about markdown, role history |
//! | [`ErrorLayout`] | any | status page |
//!
//! Article cards and the role history are shared fragments
//! ([`article_card`], [`role_list`]) so every page that lists them renders
//! them the same way.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating,
//! which escapes interpolated text. Markdown bodies are converted with
//! pulldown-cmark and inserted pre-escaped.

use crate::catalog::ArticleWithSlug;
use crate::config::SiteMeta;
use crate::locale::{self, LocaleConfig, LocalePrefix};
use crate::profile::{Profile, Project, Role};
use chrono::NaiveDate;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};

pub const CSS: &str = include_str!("../static/style.css");

/// Number of article cards on the home page.
pub const HOME_ARTICLE_COUNT: usize = 5;

/// Request-level context shared by every layout.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub site: &'a SiteMeta,
    pub locales: &'a LocaleConfig,
    /// Active locale.
    pub locale: &'a str,
    /// Unprefixed path of the page, e.g. `/articles`.
    pub path: &'a str,
}

impl PageContext<'_> {
    /// Visible link to an unprefixed path in the active locale.
    pub fn href(&self, path: &str) -> String {
        self.locales.localized_path(self.locale, path)
    }
}

/// The page-specific part of a rendered page.
pub trait PageLayout {
    /// Text for `<title>`, before the site title is appended.
    fn title(&self) -> String;

    fn body_class(&self) -> Option<&'static str> {
        None
    }

    fn content(&self, ctx: &PageContext<'_>, catalog: &[ArticleWithSlug]) -> Markup;
}

/// Render a complete HTML document.
pub fn render_page(
    layout: &dyn PageLayout,
    ctx: &PageContext<'_>,
    catalog: &[ArticleWithSlug],
) -> Markup {
    let page_title = layout.title();
    let full_title = if page_title.is_empty() {
        ctx.site.title.clone()
    } else {
        format!("{} · {}", page_title, ctx.site.title)
    };

    html! {
        (DOCTYPE)
        html lang=(ctx.locale) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="description" content=(ctx.site.description);
                title { (full_title) }
                style { (PreEscaped(CSS)) }
            }
            body class=[layout.body_class()] {
                (site_header(ctx))
                main { (layout.content(ctx, catalog)) }
                footer.site-footer {
                    "© " (ctx.site.author)
                }
            }
        }
    }
}

// ============================================================================
// Shared fragments
// ============================================================================

const NAV_ITEMS: [(&str, &str); 3] = [
    ("/articles", "Articles"),
    ("/projects", "Projects"),
    ("/about", "About"),
];

fn site_header(ctx: &PageContext<'_>) -> Markup {
    html! {
        header.site-header {
            a.site-title href=(ctx.href("/")) { (ctx.site.title) }
            nav.site-nav {
                ul {
                    @for (path, label) in NAV_ITEMS {
                        @let current = ctx.path == path
                            || ctx.path.starts_with(&format!("{path}/"));
                        li class=[current.then_some("current")] {
                            a href=(ctx.href(path)) { (label) }
                        }
                    }
                }
            }
            @if ctx.locales.locales().len() > 1 {
                (locale_switcher(ctx))
            }
        }
    }
}

/// Links to the current page in every other locale.
///
/// Under `never` no visible path selects a locale, so the links use the
/// explicit `/<locale>/...` form, which routing passes through.
fn locale_switcher(ctx: &PageContext<'_>) -> Markup {
    let switch_href = |target: &str| match ctx.locales.prefix() {
        LocalePrefix::Never => locale::qualify(target, ctx.path),
        _ => ctx.locales.localized_path(target, ctx.path),
    };
    html! {
        nav.locale-switcher {
            @for locale in ctx.locales.locales() {
                @if locale == ctx.locale {
                    span.current lang=(locale) { (locale) }
                } @else {
                    a href=(switch_href(locale)) hreflang=(locale) {
                        (locale)
                    }
                }
            }
        }
    }
}

/// One article in a listing.
pub fn article_card(ctx: &PageContext<'_>, article: &ArticleWithSlug) -> Markup {
    let meta = &article.metadata;
    let href = ctx.href(&format!("/articles/{}", article.slug));
    html! {
        article.article-card {
            @if let Some(image) = &meta.image {
                a.card-image href=(href) {
                    img src=(image) alt="" loading="lazy";
                }
            }
            h3 { a href=(href) { (meta.title) } }
            time datetime=(meta.date.to_string()) { (format_date(meta.date)) }
            p { (meta.description) }
        }
    }
}

fn article_list(ctx: &PageContext<'_>, articles: &[ArticleWithSlug]) -> Markup {
    html! {
        @if articles.is_empty() {
            p.empty { "Nothing published yet." }
        } @else {
            div.article-list {
                @for article in articles {
                    (article_card(ctx, article))
                }
            }
        }
    }
}

/// The role history, most recent first as listed.
pub fn role_list(roles: &[Role]) -> Markup {
    html! {
        @if !roles.is_empty() {
            section.roles {
                h2 { "Experience" }
                ol.role-list {
                    @for role in roles {
                        li.role {
                            h3 {
                                (role.title)
                                @if !role.organization.is_empty() {
                                    " · " span.organization { (role.organization) }
                                }
                            }
                            @if !role.period.is_empty() {
                                p.period { (role.period) }
                            }
                            @if !role.summary.is_empty() {
                                p { (role.summary) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn project_card(project: &Project) -> Markup {
    html! {
        li.project {
            h3 {
                @if let Some(url) = &project.url {
                    a href=(url) rel="noopener" { (project.name) }
                } @else {
                    (project.name)
                }
            }
            p { (project.description) }
            @if !project.tags.is_empty() {
                ul.tags {
                    @for tag in &project.tags {
                        li { (tag) }
                    }
                }
            }
        }
    }
}

/// Markdown to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(
        markdown,
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_FOOTNOTES,
    );
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

/// `March 18, 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

// ============================================================================
// Layouts
// ============================================================================

pub struct HomeLayout<'a> {
    pub profile: &'a Profile,
}

impl PageLayout for HomeLayout<'_> {
    fn title(&self) -> String {
        String::new()
    }

    fn body_class(&self) -> Option<&'static str> {
        Some("home")
    }

    fn content(&self, ctx: &PageContext<'_>, catalog: &[ArticleWithSlug]) -> Markup {
        let latest = &catalog[..catalog.len().min(HOME_ARTICLE_COUNT)];
        html! {
            @if !self.profile.intro.is_empty() {
                section.intro { p { (self.profile.intro) } }
            }
            section.latest {
                h2 { "Latest writing" }
                (article_list(ctx, latest))
                @if catalog.len() > latest.len() {
                    p.more { a href=(ctx.href("/articles")) { "All articles →" } }
                }
            }
            (role_list(&self.profile.roles))
        }
    }
}

pub struct ArticlesLayout;

impl PageLayout for ArticlesLayout {
    fn title(&self) -> String {
        "Articles".to_string()
    }

    fn content(&self, ctx: &PageContext<'_>, catalog: &[ArticleWithSlug]) -> Markup {
        html! {
            h1 { "Articles" }
            (article_list(ctx, catalog))
        }
    }
}

pub struct ArticleLayout<'a> {
    pub article: &'a ArticleWithSlug,
}

impl PageLayout for ArticleLayout<'_> {
    fn title(&self) -> String {
        self.article.metadata.title.clone()
    }

    fn body_class(&self) -> Option<&'static str> {
        Some("article-page")
    }

    fn content(&self, ctx: &PageContext<'_>, _catalog: &[ArticleWithSlug]) -> Markup {
        let meta = &self.article.metadata;
        html! {
            article.article {
                header {
                    h1 { (meta.title) }
                    p.byline {
                        time datetime=(meta.date.to_string()) { (format_date(meta.date)) }
                        @if let Some(author) = &meta.author {
                            " · " (author)
                        }
                    }
                    @if let Some(image) = &meta.image {
                        img.hero src=(image) alt="";
                    }
                }
                div.article-body {
                    (PreEscaped(markdown_to_html(&self.article.body)))
                }
                footer {
                    a href=(ctx.href("/articles")) { "← All articles" }
                }
            }
        }
    }
}

pub struct ProjectsLayout<'a> {
    pub projects: &'a [Project],
}

impl PageLayout for ProjectsLayout<'_> {
    fn title(&self) -> String {
        "Projects".to_string()
    }

    fn content(&self, _ctx: &PageContext<'_>, _catalog: &[ArticleWithSlug]) -> Markup {
        html! {
            h1 { "Projects" }
            @if self.projects.is_empty() {
                p.empty { "No projects listed." }
            } @else {
                ul.project-list {
                    @for project in self.projects {
                        (project_card(project))
                    }
                }
            }
        }
    }
}

pub struct AboutLayout<'a> {
    pub profile: &'a Profile,
}

impl PageLayout for AboutLayout<'_> {
    fn title(&self) -> String {
        "About".to_string()
    }

    fn body_class(&self) -> Option<&'static str> {
        Some("about-page")
    }

    fn content(&self, _ctx: &PageContext<'_>, _catalog: &[ArticleWithSlug]) -> Markup {
        html! {
            article.about-content {
                @match &self.profile.about {
                    Some(about) => { (PreEscaped(markdown_to_html(about))) }
                    None => { h1 { "About" } }
                }
            }
            (role_list(&self.profile.roles))
        }
    }
}

/// Status pages (404, 500).
pub struct ErrorLayout<'a> {
    pub status: u16,
    pub message: &'a str,
}

impl PageLayout for ErrorLayout<'_> {
    fn title(&self) -> String {
        self.status.to_string()
    }

    fn body_class(&self) -> Option<&'static str> {
        Some("error-page")
    }

    fn content(&self, ctx: &PageContext<'_>, _catalog: &[ArticleWithSlug]) -> Markup {
        html! {
            h1 { (self.status) }
            p { (self.message) }
            p { a href=(ctx.href("/")) { "Home" } }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::article;

    fn site() -> SiteMeta {
        SiteMeta {
            title: "Ada Notes".to_string(),
            author: "Ada".to_string(),
            description: "Writing".to_string(),
        }
    }

    fn locales() -> LocaleConfig {
        LocaleConfig::new(vec!["en".into(), "fr".into()], "en", LocalePrefix::AsNeeded).unwrap()
    }

    fn ctx<'a>(
        site: &'a SiteMeta,
        locales: &'a LocaleConfig,
        locale: &'a str,
        path: &'a str,
    ) -> PageContext<'a> {
        PageContext {
            site,
            locales,
            locale,
            path,
        }
    }

    fn catalog(n: usize) -> Vec<ArticleWithSlug> {
        (0..n)
            .map(|i| article(&format!("post-{i}"), &format!("Post {i}"), "2024-01-01"))
            .collect()
    }

    // =========================================================================
    // Shell
    // =========================================================================

    #[test]
    fn document_shell() {
        let (site, locales) = (site(), locales());
        let html = render_page(&ArticlesLayout, &ctx(&site, &locales, "fr", "/articles"), &[])
            .into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="fr">"#));
        assert!(html.contains("<title>Articles · Ada Notes</title>"));
    }

    #[test]
    fn home_title_is_site_title() {
        let (site, locales) = (site(), locales());
        let profile = Profile::default();
        let html = render_page(
            &HomeLayout { profile: &profile },
            &ctx(&site, &locales, "en", "/"),
            &[],
        )
        .into_string();
        assert!(html.contains("<title>Ada Notes</title>"));
    }

    #[test]
    fn nav_links_follow_locale_policy() {
        let (site, locales) = (site(), locales());
        let en = render_page(&ArticlesLayout, &ctx(&site, &locales, "en", "/articles"), &[])
            .into_string();
        assert!(en.contains(r#"href="/projects""#));
        let fr = render_page(&ArticlesLayout, &ctx(&site, &locales, "fr", "/articles"), &[])
            .into_string();
        assert!(fr.contains(r#"href="/fr/projects""#));
        assert!(fr.contains(r#"href="/fr""#));
    }

    #[test]
    fn nav_marks_current_section() {
        let (site, locales) = (site(), locales());
        let html = render_page(&ArticlesLayout, &ctx(&site, &locales, "en", "/articles/x"), &[])
            .into_string();
        assert!(html.contains(r#"<li class="current"><a href="/articles">"#));
    }

    #[test]
    fn locale_switcher_links_same_page() {
        let (site, locales) = (site(), locales());
        let html = render_page(&ArticlesLayout, &ctx(&site, &locales, "en", "/articles"), &[])
            .into_string();
        assert!(html.contains(r#"href="/fr/articles" hreflang="fr""#));
    }

    #[test]
    fn locale_switcher_under_never_uses_explicit_paths() {
        let (site, profile) = (site(), Profile::default());
        let locales =
            LocaleConfig::new(vec!["en".into(), "fr".into()], "en", LocalePrefix::Never).unwrap();
        let layout = AboutLayout { profile: &profile };
        let html = render_page(&layout, &ctx(&site, &locales, "en", "/about"), &[]).into_string();
        assert!(html.contains(r#"<a href="/fr/about" hreflang="fr">"#));
        assert!(!html.contains(r#"<a href="/about" hreflang="fr">"#));
    }

    #[test]
    fn single_locale_has_no_switcher() {
        let site = site();
        let locales = LocaleConfig::new(vec!["en".into()], "en", LocalePrefix::AsNeeded).unwrap();
        let html = render_page(&ArticlesLayout, &ctx(&site, &locales, "en", "/articles"), &[])
            .into_string();
        assert!(!html.contains(r#"class="locale-switcher""#));
    }

    // =========================================================================
    // Fragments
    // =========================================================================

    #[test]
    fn article_card_links_by_slug() {
        let (site, locales) = (site(), locales());
        let a = article("hello-world", "Hello", "2024-03-18");
        let html = article_card(&ctx(&site, &locales, "fr", "/"), &a).into_string();
        assert!(html.contains(r#"href="/fr/articles/hello-world""#));
        assert!(html.contains(r#"datetime="2024-03-18""#));
        assert!(html.contains("March 18, 2024"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn article_card_shows_image() {
        let (site, locales) = (site(), locales());
        let mut a = article("a", "A", "2024-01-01");
        a.metadata.image = Some("/images/a.jpg".to_string());
        let html = article_card(&ctx(&site, &locales, "en", "/"), &a).into_string();
        assert!(html.contains(r#"src="/images/a.jpg""#));
    }

    #[test]
    fn role_list_empty_renders_nothing() {
        assert_eq!(role_list(&[]).into_string(), "");
    }

    #[test]
    fn role_list_renders_roles() {
        let roles = vec![Role {
            title: "Engineer".into(),
            organization: "Northwind".into(),
            period: "2020 – 2023".into(),
            summary: String::new(),
        }];
        let html = role_list(&roles).into_string();
        assert!(html.contains("Engineer"));
        assert!(html.contains("Northwind"));
        assert!(html.contains("2020 – 2023"));
    }

    #[test]
    fn escapes_content() {
        let (site, locales) = (site(), locales());
        let a = article("x", "<script>alert('xss')</script>", "2024-01-01");
        let html = article_card(&ctx(&site, &locales, "en", "/"), &a).into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    // =========================================================================
    // Layouts
    // =========================================================================

    #[test]
    fn home_limits_latest_articles() {
        let (site, locales) = (site(), locales());
        let profile = Profile::default();
        let html = render_page(
            &HomeLayout { profile: &profile },
            &ctx(&site, &locales, "en", "/"),
            &catalog(7),
        )
        .into_string();
        assert_eq!(html.matches(r#"class="article-card""#).count(), HOME_ARTICLE_COUNT);
        assert!(html.contains("All articles"));
    }

    #[test]
    fn home_and_about_share_role_markup() {
        let (site, locales) = (site(), locales());
        let profile = Profile {
            roles: vec![Role {
                title: "Engineer".into(),
                ..Role::default()
            }],
            about: Some("# About\n\nHello **there**.".into()),
            ..Profile::default()
        };
        let c = ctx(&site, &locales, "en", "/");
        let expected = role_list(&profile.roles).into_string();
        let home = render_page(&HomeLayout { profile: &profile }, &c, &[]).into_string();
        let about = render_page(&AboutLayout { profile: &profile }, &c, &[]).into_string();
        assert!(home.contains(&expected));
        assert!(about.contains(&expected));
        assert!(about.contains("<strong>there</strong>"));
    }

    #[test]
    fn articles_lists_whole_catalog() {
        let (site, locales) = (site(), locales());
        let html = render_page(&ArticlesLayout, &ctx(&site, &locales, "en", "/articles"), &catalog(7))
            .into_string();
        assert_eq!(html.matches(r#"class="article-card""#).count(), 7);
    }

    #[test]
    fn empty_catalog_message() {
        let (site, locales) = (site(), locales());
        let html = render_page(&ArticlesLayout, &ctx(&site, &locales, "en", "/articles"), &[])
            .into_string();
        assert!(html.contains("Nothing published yet."));
    }

    #[test]
    fn article_page_renders_markdown_body() {
        let (site, locales) = (site(), locales());
        let mut a = article("a", "A Title", "2024-01-01");
        a.body = "Some *emphasis*.\n\n| a | b |\n|---|---|\n| 1 | 2 |\n".into();
        let html = render_page(
            &ArticleLayout { article: &a },
            &ctx(&site, &locales, "en", "/articles/a"),
            &[],
        )
        .into_string();
        assert!(html.contains("<title>A Title · Ada Notes</title>"));
        assert!(html.contains("<em>emphasis</em>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn projects_page() {
        let (site, locales) = (site(), locales());
        let projects = vec![
            Project {
                name: "folio".into(),
                description: "This site".into(),
                url: Some("https://example.com/folio".into()),
                tags: vec!["rust".into()],
            },
            Project {
                name: "notes".into(),
                ..Project::default()
            },
        ];
        let html = render_page(
            &ProjectsLayout { projects: &projects },
            &ctx(&site, &locales, "en", "/projects"),
            &[],
        )
        .into_string();
        assert!(html.contains(r#"href="https://example.com/folio""#));
        assert!(html.contains("<li>rust</li>"));
        assert_eq!(html.matches(r#"class="project""#).count(), 2);
    }

    #[test]
    fn error_page() {
        let (site, locales) = (site(), locales());
        let html = render_page(
            &ErrorLayout {
                status: 404,
                message: "Not found",
            },
            &ctx(&site, &locales, "fr", "/missing"),
            &[],
        )
        .into_string();
        assert!(html.contains("<h1>404</h1>"));
        assert!(html.contains(r#"href="/fr""#));
    }

    #[test]
    fn format_date_long_form() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        assert_eq!(format_date(date), "March 8, 2024");
    }
}
