//! # tutorgen CLI
//!
//! The `tutorgen` binary runs either the generation dispatcher HTTP server or
//! the Markdown to HTML batch converter.
//!
//! ## Usage
//!
//! ```bash
//! tutorgen --config ./tutorgen.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tutorgen serve` | Start the HTTP API (`POST /generate`, `GET /`) |
//! | `tutorgen convert <src> [out]` | Render every `*.md` under `src` into `out` (default `src/html`) |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tutorgen::{config, convert, server, telemetry};

/// tutorgen: dispatch tutorial generation and render its Markdown output.
#[derive(Parser)]
#[command(
    name = "tutorgen",
    about = "Dispatch codebase tutorial generation over HTTP and render Markdown to HTML",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./tutorgen.toml`. When the file does not exist, built-in
    /// defaults are used.
    #[arg(long, global = true, default_value = "./tutorgen.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API.
    ///
    /// Binds to `[server].bind` unless `--bind` is given.
    Serve {
        /// Override the listen address (e.g. `0.0.0.0:8000`).
        #[arg(long)]
        bind: Option<String>,
    },

    /// Convert a folder of Markdown documents to HTML pages.
    Convert {
        /// Folder containing `.md` files (searched recursively).
        source: Option<PathBuf>,

        /// Output folder. Defaults to `<source>/html`.
        output: Option<PathBuf>,
    },
}

const CONVERT_USAGE: &str = "Usage: tutorgen convert <md_folder_path> [output_folder]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_logging()?;

    let cli = Cli::parse();
    let mut cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                cfg.server.bind = bind;
            }
            server::run_server(&cfg).await?;
        }
        Commands::Convert { source, output } => {
            let Some(source) = source else {
                eprintln!("{}", CONVERT_USAGE);
                std::process::exit(1);
            };
            convert::run_convert(&cfg.converter, &source, output.as_deref())?;
        }
    }

    Ok(())
}
