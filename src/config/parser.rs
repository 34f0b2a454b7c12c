//! Generic TOML configuration parsing.
//!
//! Reads a file and deserializes it into any [`serde::de::DeserializeOwned`]
//! type, attaching the file path to both read and parse failures:
//!
//! ```text
//! Failed to parse config file: /path/to/mdxe.toml
//! Caused by:
//!     invalid type: string "yes", expected a boolean
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML configuration file into the specified type.
///
/// # Examples
///
/// ```rust,no_run
/// use mdxe::config::{MdxeConfig, parse_config};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let config: MdxeConfig = parse_config(Path::new("mdxe.toml"))?;
/// println!("Registry: {}", config.imports.base_url);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if the file cannot be read, contains invalid TOML, or
/// does not match the shape of `T`.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
