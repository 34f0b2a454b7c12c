//! Command-line interface for MDXE.
//!
//! # Available Commands
//!
//! - `compile` - Compile an MDX document into a module
//! - `resolve` - Show where a specifier resolves to
//! - `cache` - Inspect the remote artifact cache
//!
//! ```bash
//! mdxe compile post.mdx --component Button=react-button --json
//! mdxe resolve @mdx-js/react --version 3.0.1
//! mdxe cache key https://esm.sh/react@18.2.0
//! ```
//!
//! # Logging
//!
//! Log output goes to stderr through `tracing`. `RUST_LOG` is honored unless
//! `--verbose` (debug) or `--quiet` (errors only) is given.

mod cache;
mod compile;
mod resolve;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::MdxeConfig;

/// Main CLI application structure for MDXE.
#[derive(Parser, Debug)]
#[command(
    name = "mdxe",
    about = "MDX compiler with remote component and layout resolution",
    version,
    author,
    long_about = "Compiles MDX documents, resolving components and layouts from package registries \
                  through a local content-addressed cache."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to mdxe.toml (defaults to MDXE_CONFIG_PATH, then discovery).
    #[arg(short, long, global = true, env = "MDXE_CONFIG_PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile an MDX document.
    ///
    /// See [`compile::CompileCommand`] for options.
    Compile(compile::CompileCommand),

    /// Resolve a specifier to a registry URL.
    Resolve(resolve::ResolveCommand),

    /// Inspect the remote artifact cache.
    Cache(cache::CacheCommand),
}

impl Cli {
    /// Execute the parsed command.
    ///
    /// # Errors
    ///
    /// Propagates configuration, resolution, fetch, and compilation failures
    /// for rendering by [`crate::core::user_friendly_error`].
    pub async fn execute(self) -> Result<()> {
        self.init_logging();

        let config = MdxeConfig::load(self.config.as_deref())?;

        match self.command {
            Commands::Compile(cmd) => cmd.execute(&config).await,
            Commands::Resolve(cmd) => cmd.execute(&config).await,
            Commands::Cache(cmd) => cmd.execute(&config),
        }
    }

    fn log_filter(&self) -> EnvFilter {
        if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    }

    fn init_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.log_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}
