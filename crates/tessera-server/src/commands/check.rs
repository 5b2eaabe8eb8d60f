//! `tessera check-config`

use anyhow::{Context, Result};
use std::path::Path;
use tessera_core::TesseraConfig;

pub fn run(path: &Path) -> Result<()> {
    let config = TesseraConfig::from_file(path)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;

    println!("✓ {} is valid", path.display());
    println!("  listen:     {}", config.server.bind_address());
    println!("  upstream:   {}", config.upstream.redacted_target());
    println!(
        "  pool:       {}..{} connections, {}s acquire timeout",
        config.upstream.pool.min_connections,
        config.upstream.pool.max_connections,
        config.upstream.pool.acquire_timeout_seconds
    );
    println!(
        "  headers:    {} > {}",
        config.tenancy.project_header, config.tenancy.tenant_header
    );
    println!("  token ttl:  {}s", config.token.ttl_seconds);
    Ok(())
}
