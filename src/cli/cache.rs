//! `mdxe cache`

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cache::CacheStore;
use crate::config::MdxeConfig;

/// Inspect the remote artifact cache.
///
/// Entries are never evicted by mdxe; remove the directory printed by
/// `mdxe cache path` to start over.
#[derive(Args, Debug)]
pub struct CacheCommand {
    #[command(subcommand)]
    command: CacheSubcommands,
}

#[derive(Subcommand, Debug)]
enum CacheSubcommands {
    /// Print the cache root directory
    Path,

    /// Print the cache key and entry path for a URL
    Key {
        /// Exact URL as it appears in compiled output
        url: String,
    },
}

impl CacheCommand {
    pub fn execute(self, config: &MdxeConfig) -> Result<()> {
        let store = config.cache_store();
        match self.command {
            CacheSubcommands::Path => println!("{}", store.root().display()),
            CacheSubcommands::Key {
                url,
            } => {
                println!("{}", CacheStore::key_for(&url));
                println!("{}", store.path_for(&url).display());
            }
        }
        Ok(())
    }
}
