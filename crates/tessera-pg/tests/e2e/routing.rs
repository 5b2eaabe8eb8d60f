//! Connection routing tests: search_path switching and release.

use super::common::*;
use std::time::Duration;
use tessera_core::TenantId;
use tessera_pg::PgError;

async fn search_path(conn: &mut sqlx::PgConnection) -> String {
    sqlx::query_scalar("SELECT current_setting('search_path')")
        .fetch_one(conn)
        .await
        .unwrap()
}

pub async fn test_acquire_routes_to_tenant(ctx: &TestContext) {
    println!("  🧪 test_acquire_routes_to_tenant");

    let router = ctx.router();
    let initech = tenant("initech");

    let mut conn = router.acquire(&initech).await.expect("acquire");
    assert_eq!(search_path(&mut conn).await, "tenant_initech");
    assert!(router.is_provisioned(&initech));

    // Unqualified names resolve inside the tenant.
    let schema: String = sqlx::query_scalar(
        "SELECT table_schema::text FROM information_schema.tables \
         WHERE table_name = 'users' AND table_schema = current_schema()",
    )
    .fetch_one(&mut *conn)
    .await
    .unwrap();
    assert_eq!(schema, "tenant_initech");

    router.release(conn).await;
    println!("     ✓ Connection routed to tenant schema");
}

pub async fn test_release_resets_search_path(ctx: &TestContext) {
    println!("  🧪 test_release_resets_search_path");

    let router = ctx.router_with_pool_size(1, Duration::from_secs(5)).await;
    let hooli = tenant("hooli");

    let conn = router.acquire(&hooli).await.unwrap();
    conn.release().await;

    // Single-connection pool: this is the same physical connection.
    let mut raw = router.pool().acquire().await.unwrap();
    assert_eq!(search_path(&mut raw).await, "public");

    println!("     ✓ search_path reset to public on release");
}

pub async fn test_dropped_connection_is_not_reused(ctx: &TestContext) {
    println!("  🧪 test_dropped_connection_is_not_reused");

    let router = ctx.router_with_pool_size(1, Duration::from_secs(5)).await;
    let hooli = tenant("hooli");

    let mut conn = router.acquire(&hooli).await.unwrap();
    let first_pid: i32 = sqlx::query_scalar("SELECT pg_backend_pid()")
        .fetch_one(&mut *conn)
        .await
        .unwrap();
    drop(conn);

    let mut raw = router.pool().acquire().await.unwrap();
    let second_pid: i32 = sqlx::query_scalar("SELECT pg_backend_pid()")
        .fetch_one(&mut *raw)
        .await
        .unwrap();
    assert_ne!(first_pid, second_pid, "unreleased connection must be closed");
    assert_eq!(search_path(&mut raw).await, "\"$user\", public");

    println!("     ✓ Unreleased connection closed instead of pooled");
}

pub async fn test_with_connection_releases_on_error(ctx: &TestContext) {
    println!("  🧪 test_with_connection_releases_on_error");

    let router = ctx.router_with_pool_size(1, Duration::from_secs(2)).await;
    let hooli = tenant("hooli");

    let result: Result<(), PgError> = router
        .with_connection(&hooli, |conn| {
            Box::pin(async move {
                sqlx::query("SELECT * FROM no_such_table")
                    .execute(conn)
                    .await?;
                Ok(())
            })
        })
        .await;
    assert!(matches!(result, Err(PgError::Database(_))));

    // The only connection is available again and back on public.
    let path = router
        .with_connection(&TenantId::public(), |conn| {
            Box::pin(async move { Ok(search_path(conn).await) })
        })
        .await
        .unwrap();
    assert_eq!(path, "public");

    println!("     ✓ with_connection releases after failed work");
}

pub async fn test_pool_exhaustion(ctx: &TestContext) {
    println!("  🧪 test_pool_exhaustion");

    let router = ctx.router_with_pool_size(1, Duration::from_secs(1)).await;
    let hooli = tenant("hooli");

    let held = router.acquire(&hooli).await.unwrap();
    let second = router.acquire(&hooli).await;
    assert!(matches!(second, Err(PgError::PoolExhausted { timeout_secs: 1 })));
    assert!(second.unwrap_err().is_retryable());

    held.release().await;
    let again = router.acquire(&hooli).await.unwrap();
    again.release().await;

    println!("     ✓ Bounded wait surfaces PoolExhausted");
}

pub async fn run_all_tests(ctx: &TestContext) {
    println!("\n🔀 Routing Tests");
    test_acquire_routes_to_tenant(ctx).await;
    test_release_resets_search_path(ctx).await;
    test_dropped_connection_is_not_reused(ctx).await;
    test_with_connection_releases_on_error(ctx).await;
    test_pool_exhaustion(ctx).await;
}
