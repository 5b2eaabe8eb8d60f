//! `tessera grant-admin`

use anyhow::{Context, Result};
use tessera_core::{TenantId, TesseraConfig};
use tessera_pg::{ConnectionRouter, UserRepository};
use tessera_token::Role;

pub async fn run(config: &TesseraConfig, raw_tenant: &str, email: &str) -> Result<()> {
    let tenant = TenantId::normalize(raw_tenant)
        .with_context(|| format!("invalid tenant identifier {raw_tenant:?}"))?;

    let router = ConnectionRouter::connect(&config.upstream).await?;
    let users = UserRepository::new(router);
    let user = users
        .set_role(&tenant, email.trim(), Role::Admin)
        .await
        .with_context(|| format!("failed to promote {email} in {tenant}"))?;

    println!("{} ({}) is now {} in {tenant}", user.email, user.id, user.role);
    Ok(())
}
