//! Print loop configuration as TOML

use anyhow::{Context, Result};
use lightdrive_core::LoopConfig;
use std::path::Path;

/// Print the default configuration, or the validated contents of `path`
/// with every default filled in
pub fn run(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(path) => LoopConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => LoopConfig::default(),
    };
    print!("{}", config.to_toml_string().context("Failed to serialize config")?);
    Ok(())
}
