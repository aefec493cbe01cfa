use clap::{Parser, Subcommand};
use folio::catalog::ArticleSource;
use folio::server::{self, AppState};
use folio::{config, logging, output};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Personal site engine: articles, projects and an about page")]
#[command(long_about = "\
Personal site engine: articles, projects and an about page

Your filesystem is the data source. Markdown files with a YAML header become
articles, listed newest first. Every request goes through locale routing
before a page is rendered.

Site structure:

  site/
  ├── config.toml                  # Site config (optional)
  ├── articles/
  │   ├── hello-world.md           # /articles/hello-world
  │   ├── shipping-v2/
  │   │   └── index.md             # /articles/shipping-v2
  │   └── _drafts/                 # Leading underscore = skipped
  ├── pages/
  │   ├── profile.toml             # Intro, roles, projects
  │   └── about.md                 # About page
  └── public/                      # Served as-is (images, favicon, cv.pdf)

Article header:

  ---
  title: Hello, World
  description: Saying hello.
  date: 2024-01-15
  image: /images/hello.jpg         # optional, must exist under public/
  ---

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the site over HTTP
    Serve {
        /// Listen address (overrides [server] addr)
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Validate config and content, listing every problem entry
    Check,
    /// List the article catalog, newest first
    Articles {
        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// Show the routing decision for a request path
    Route {
        /// Request path, e.g. /about
        path: String,
        /// Accept-Language header value
        #[arg(long)]
        accept_language: Option<String>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    match cli.command {
        Command::Serve { addr } => {
            let site_config = config::load_config(&cli.root)?;
            let addr = addr.unwrap_or(site_config.server.addr);
            let state = AppState::new(&cli.root, site_config)?;
            tracing::info!(root = %cli.root.display(), "serving site");
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(server::serve(state, addr))?;
        }
        Command::Check => {
            let site_config = config::load_config(&cli.root)?;
            println!("==> Checking {}", cli.root.display());
            let source = ArticleSource::from_config(&cli.root, &site_config);
            let report = source.build_report()?;
            output::print_check_output(&report, source.store().root());
            let excluded = report.diagnostics.iter().filter(|d| d.excluded()).count();
            if excluded > 0 {
                return Err(format!("{excluded} entries excluded from the catalog").into());
            }
            println!("==> Content is valid");
        }
        Command::Articles { json } => {
            let site_config = config::load_config(&cli.root)?;
            let articles = ArticleSource::from_config(&cli.root, &site_config).get_catalog()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&articles)?);
            } else {
                output::print_catalog(&articles);
            }
        }
        Command::Route {
            path,
            accept_language,
        } => {
            let router = config::load_config(&cli.root)?.locale_router()?;
            let decision = router.decide(&path, accept_language.as_deref());
            output::print_decision(&path, &decision);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
