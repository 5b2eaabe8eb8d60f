//! `tessera serve`

use anyhow::{Context, Result, bail};
use tessera_core::TesseraConfig;
use tessera_server::TesseraServer;

pub async fn run(mut config: TesseraConfig, listen: Option<String>) -> Result<()> {
    if let Some(listen) = listen {
        apply_listen_override(&mut config, &listen)?;
    }

    tracing::info!(
        project = config.project.as_deref().unwrap_or("tessera"),
        upstream = %config.upstream.redacted_target(),
        token_ttl_seconds = config.token.ttl_seconds,
        "starting tessera"
    );

    TesseraServer::new(config).run().await
}

fn apply_listen_override(config: &mut TesseraConfig, listen: &str) -> Result<()> {
    let Some((addr, port)) = listen.rsplit_once(':') else {
        bail!("--listen must be ADDR:PORT, got {listen}");
    };
    config.server.listen_port = port
        .parse()
        .with_context(|| format!("invalid port in --listen {listen}"))?;
    config.server.listen_addr = addr.to_string();
    Ok(())
}
