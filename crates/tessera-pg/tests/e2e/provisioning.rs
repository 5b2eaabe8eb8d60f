//! Provisioning tests: idempotency and concurrency.

use super::common::*;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tessera_core::TenantId;
use tessera_pg::{ConnectionRouter, PgError, SchemaProvisioner};

pub async fn test_concurrent_ensure_creates_one_schema(ctx: &TestContext) {
    println!("  🧪 test_concurrent_ensure_creates_one_schema");

    let provisioner = Arc::new(SchemaProvisioner::new(ctx.pool.clone()));
    let acme = tenant("acme");

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let provisioner = provisioner.clone();
            let acme = acme.clone();
            tokio::spawn(async move { provisioner.ensure(&acme).await })
        })
        .collect();

    let mut errors = Vec::new();
    for handle in handles {
        if let Err(e) = handle.await.expect("ensure task panicked") {
            errors.push(e.to_string());
        }
    }

    assert!(errors.is_empty(), "concurrent ensure failed: {:?}", errors);
    assert_eq!(schema_count(&ctx.pool, &acme).await, 1);

    println!("     ✓ 50 concurrent ensure calls produced exactly one schema");
}

pub async fn test_ensure_is_idempotent(ctx: &TestContext) {
    println!("  🧪 test_ensure_is_idempotent");

    let provisioner = SchemaProvisioner::new(ctx.pool.clone());
    let globex = tenant("globex");

    provisioner.ensure(&globex).await.expect("first ensure");
    provisioner.ensure(&globex).await.expect("second ensure");
    assert!(provisioner.exists(&globex).await.unwrap());

    let users_table: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
         WHERE table_schema = $1 AND table_name = 'users')",
    )
    .bind(globex.as_str())
    .fetch_one(&ctx.pool)
    .await
    .unwrap();
    assert!(users_table, "tenant users table should exist");

    println!("     ✓ Repeated ensure is a no-op");
}

pub async fn test_default_tenant_not_provisioned(ctx: &TestContext) {
    println!("  🧪 test_default_tenant_not_provisioned");

    let provisioner = SchemaProvisioner::new(ctx.pool.clone());
    let before: i64 = sqlx::query_scalar("SELECT count(*) FROM information_schema.schemata")
        .fetch_one(&ctx.pool)
        .await
        .unwrap();

    provisioner.ensure(&TenantId::public()).await.unwrap();

    let after: i64 = sqlx::query_scalar("SELECT count(*) FROM information_schema.schemata")
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(before, after);

    provisioner.prepare_default().await.unwrap();
    provisioner.prepare_default().await.unwrap();

    println!("     ✓ Default tenant is left alone");
}

pub async fn test_ensure_without_create_privilege_fails(ctx: &TestContext) {
    println!("  🧪 test_ensure_without_create_privilege_fails");

    sqlx::raw_sql(
        "DROP ROLE IF EXISTS tessera_no_create; \
         CREATE ROLE tessera_no_create LOGIN PASSWORD 'no_create'; \
         REVOKE CREATE ON DATABASE tessera_test FROM PUBLIC;",
    )
    .execute(&ctx.pool)
    .await
    .expect("create unprivileged role");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url_as("tessera_no_create", "no_create"))
        .await
        .expect("unprivileged role should connect");
    let router = ConnectionRouter::from_pool(pool.clone());
    let initech = tenant("initech");

    let result = router.provisioner().ensure(&initech).await;
    assert!(
        matches!(result, Err(PgError::ProvisioningFailed { ref tenant, .. }) if tenant == "tenant_initech"),
        "expected ProvisioningFailed, got {:?}",
        result
    );

    let result = router.acquire(&initech).await;
    assert!(matches!(result, Err(PgError::ProvisioningFailed { .. })));
    assert!(!router.is_provisioned(&initech));
    assert_eq!(schema_count(&ctx.pool, &initech).await, 0);

    pool.close().await;
    println!("     ✓ Missing CREATE privilege surfaces as ProvisioningFailed");
}

pub async fn test_failed_table_creation_leaves_no_schema(ctx: &TestContext) {
    println!("  🧪 test_failed_table_creation_leaves_no_schema");

    sqlx::raw_sql(
        "CREATE FUNCTION tessera_block_tables() RETURNS event_trigger \
         LANGUAGE plpgsql AS $$ BEGIN RAISE EXCEPTION 'table creation blocked'; END $$; \
         CREATE EVENT TRIGGER tessera_block_tables ON ddl_command_start \
         WHEN TAG IN ('CREATE TABLE') EXECUTE FUNCTION tessera_block_tables();",
    )
    .execute(&ctx.pool)
    .await
    .expect("install blocking event trigger");

    let provisioner = SchemaProvisioner::new(ctx.pool.clone());
    let hooli = tenant("hooli");
    let result = provisioner.ensure(&hooli).await;

    sqlx::raw_sql(
        "DROP EVENT TRIGGER tessera_block_tables; DROP FUNCTION tessera_block_tables();",
    )
    .execute(&ctx.pool)
    .await
    .expect("remove blocking event trigger");

    assert!(matches!(result, Err(PgError::ProvisioningFailed { .. })));
    assert_eq!(schema_count(&ctx.pool, &hooli).await, 0, "schema was half-created");

    provisioner.ensure(&hooli).await.expect("ensure after unblocking");
    assert_eq!(schema_count(&ctx.pool, &hooli).await, 1);

    println!("     ✓ Schema and table are created together or not at all");
}

pub async fn run_all_tests(ctx: &TestContext) {
    println!("\n📦 Provisioning Tests");
    test_concurrent_ensure_creates_one_schema(ctx).await;
    test_ensure_is_idempotent(ctx).await;
    test_default_tenant_not_provisioned(ctx).await;
    test_ensure_without_create_privilege_fails(ctx).await;
    test_failed_table_creation_leaves_no_schema(ctx).await;
}
