//! `mdxe resolve`

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::sync::Arc;

use crate::config::MdxeConfig;
use crate::fetcher::ReqwestTransport;
use crate::resolver::SpecifierResolver;

/// Resolve a specifier the same way `compile` would, without fetching it.
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Package name, URL, or type identifier
    specifier: String,

    /// Version applied when the specifier carries none
    #[arg(long)]
    version: Option<String>,

    /// `$context` used for mapping lookup and classification
    #[arg(long)]
    context: Option<String>,

    /// Print JSON
    #[arg(long)]
    json: bool,
}

impl ResolveCommand {
    pub async fn execute(self, config: &MdxeConfig) -> Result<()> {
        let mut resolver = SpecifierResolver::new(config.registry(), config.allow_list())
            .with_mappings(config.mappings())
            .with_layout_tokens(config.resolver.layout_tokens.clone());
        if config.resolver.probe {
            resolver = resolver.with_probe(Arc::new(ReqwestTransport::new(config.allow_list())?));
        }

        let resolved = resolver
            .resolve(&self.specifier, self.version.as_deref(), self.context.as_deref())
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        } else {
            println!("{} ({})", resolved.url.cyan(), resolved.kind.to_string().dimmed());
        }
        Ok(())
    }
}
