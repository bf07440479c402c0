use clap::{Parser, Subcommand};
use sitemill::route::{self, RouteError};
use sitemill::{config, generate, output, scan};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "sitemill")]
#[command(about = "Static site builder with file-defined, localized routes")]
#[command(long_about = "\
Static site builder with file-defined, localized routes

Every file under routes/ is a route. Its path is its URL; bracketed segments
are parameters filled by the route's instances.

Site structure:

  my-site/
  ├── config.toml                  # Site config (optional)
  └── routes/
      ├── index.toml               # /            /es/
      ├── about.toml               # /about/      /es/about/
      ├── robots.txt.toml          # /robots.txt  (i18n = false)
      └── blog/
          ├── [slug].toml          # [[instances]] give slug, locale, data
          └── page/
              └── [page].toml      # [paginate] route = \"blog-slug\"

Routes resolve in priority order (lower first); a route can only list the
instances of routes resolved before it.

Run 'sitemill gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site directory (holds config.toml and the routes directory)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Log route resolution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every route with its instances and permalinks
    Routes,
    /// Validate routes without writing anything
    Check,
    /// Resolve routes, render every page and write the site
    Build,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    match cli.command {
        Command::Routes => {
            let site = scan::scan(&cli.root)?;
            init_thread_pool(&site.config.processing);
            let routes = route::resolve_routes(site.routes, &site.config)?;
            output::print_routes_output(&routes);
        }
        Command::Check => {
            println!("==> Checking {}", cli.root.display());
            let site = scan::scan(&cli.root)?;
            let issues = route::detect_conflicts(site.routes.iter().map(|r| r.pattern()));
            output::print_issues(&issues);
            if !issues.is_empty() {
                return Err(RouteError::Ambiguous(issues).into());
            }
            init_thread_pool(&site.config.processing);
            let routes = route::resolve_routes(site.routes, &site.config)?;
            output::print_routes_output(&routes);
            println!("==> Routes are valid");
        }
        Command::Build => {
            println!("==> Stage 1: Scanning {}", cli.root.display());
            let site = scan::scan(&cli.root)?;
            init_thread_pool(&site.config.processing);

            println!("==> Stage 2: Resolving {} routes", site.routes.len());
            let routes = route::resolve_routes(site.routes, &site.config)?;
            output::print_routes_output(&routes);

            println!("==> Stage 3: Generating pages → {}", cli.output.display());
            let pages = generate::generate(&routes, &site.config, &cli.output)?;
            output::print_generate_output(&pages);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
