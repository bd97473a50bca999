//! restodash CLI - restaurant dashboard views
//!
//! ```bash
//! restodash views                      # List the ten views
//! restodash prepare                    # Load + join, print a summary
//! restodash show 3                     # Render view 3 as JSON
//! restodash show "6. Rating Count in Top 5 Cities" -o ratings.json
//! restodash serve --port 3000          # Start HTTP server
//! ```
//!
//! Paths default to `RESTODASH_RESTAURANTS` / `RESTODASH_COUNTRIES`
//! (a `.env` file is honoured) and can be overridden per command.

use clap::{Args, Parser, Subcommand};
use restodash::{load_table, server, view_list, Config, Dashboard, ViewId, ViewResponse};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "restodash")]
#[command(about = "Restaurant dataset dashboard: ten aggregation views over a country-joined table", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Restaurant dataset CSV
    #[arg(long)]
    restaurants: Option<PathBuf>,

    /// Country code lookup CSV ("Country Code", "Country")
    #[arg(long)]
    countries: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available views
    Views,

    /// Load and join the sources, then print a summary
    Prepare {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output file for the JSON summary (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render one view as JSON
    Show {
        /// View number (1-10) or exact label
        view: String,

        #[command(flatten)]
        sources: SourceArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        #[command(flatten)]
        sources: SourceArgs,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env();

    let result = match cli.command {
        Commands::Views => cmd_views(),

        Commands::Prepare { sources, output } => cmd_prepare(
            config.with_overrides(sources.restaurants, sources.countries, None),
            output.as_deref(),
        ),

        Commands::Show { view, sources, output } => cmd_show(
            &view,
            config.with_overrides(sources.restaurants, sources.countries, None),
            output.as_deref(),
        ),

        Commands::Serve { sources, port } => {
            cmd_serve(config.with_overrides(sources.restaurants, sources.countries, port)).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_views() -> Result<(), Box<dyn std::error::Error>> {
    for view in view_list() {
        println!("{}", view.label);
    }
    Ok(())
}

fn cmd_prepare(config: Config, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let summary = load_table(&config.sources)?.summary();
    let json = serde_json::to_string_pretty(&summary)?;
    write_output(&json, output)
}

fn cmd_show(view: &str, config: Config, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let view: ViewId = view.parse()?;
    let dashboard = Dashboard::load(&config.sources)?;

    let response = ViewResponse::from(dashboard.render(view));
    let json = serde_json::to_string_pretty(&response)?;
    write_output(&json, output)
}

async fn cmd_serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    server::serve(&config.sources, config.port).await?;
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
