//! `tessera provision`

use anyhow::{Context, Result};
use tessera_core::{TenantId, TesseraConfig};
use tessera_pg::ConnectionRouter;

pub async fn run(config: &TesseraConfig, raw_tenant: &str) -> Result<()> {
    let tenant = TenantId::normalize(raw_tenant)
        .with_context(|| format!("invalid tenant identifier {raw_tenant:?}"))?;

    let router = ConnectionRouter::connect(&config.upstream).await?;
    let provisioner = router.provisioner();

    if tenant.is_default() {
        provisioner.prepare_default().await?;
        println!("public partition ready");
        return Ok(());
    }

    let existed = provisioner.exists(&tenant).await?;
    provisioner.ensure(&tenant).await?;

    if existed {
        println!("{tenant} already provisioned");
    } else {
        println!("{tenant} provisioned");
    }
    Ok(())
}
