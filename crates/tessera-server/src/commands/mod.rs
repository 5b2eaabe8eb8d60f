//! `tessera` subcommands.

pub mod check;
pub mod grant_admin;
pub mod provision;
pub mod serve;

use anyhow::{Context, Result};
use std::path::Path;
use tessera_core::TesseraConfig;

/// Load configuration, falling back to defaults when the file is absent.
pub fn load_config(path: &Path) -> Result<TesseraConfig> {
    TesseraConfig::load_or_default(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}
