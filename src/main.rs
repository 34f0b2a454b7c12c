//! MDXE CLI entry point
//!
//! Parses arguments, runs the command, and renders failures with
//! suggestions. Commands:
//! - `compile` - Compile an MDX document into a module
//! - `resolve` - Resolve a specifier to a registry URL
//! - `cache` - Inspect the remote artifact cache

use anyhow::Result;
use clap::Parser;
use mdxe::cli;
use mdxe::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
