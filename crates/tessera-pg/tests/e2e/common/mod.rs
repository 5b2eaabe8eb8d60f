//! Docker PostgreSQL management shared by the tessera-pg E2E tests.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::process::Command;
use std::time::Duration;
use tessera_core::TenantId;
use tessera_pg::ConnectionRouter;

pub const CONTAINER_NAME: &str = "tessera_pg_test_postgres";
pub const POSTGRES_PORT: u16 = 5434;
pub const POSTGRES_PASSWORD: &str = "tessera_test_password";
pub const DATABASE_NAME: &str = "tessera_test";

pub fn database_url() -> String {
    database_url_as("postgres", POSTGRES_PASSWORD)
}

pub fn database_url_as(user: &str, password: &str) -> String {
    format!(
        "postgres://{}:{}@localhost:{}/{}",
        user, password, POSTGRES_PORT, DATABASE_NAME
    )
}

/// Start a PostgreSQL container, replacing a stale one with the same name.
pub fn start_postgres_container() -> Result<(), String> {
    let output = Command::new("docker")
        .args(["ps", "-a", "-q", "-f", &format!("name={}", CONTAINER_NAME)])
        .output()
        .map_err(|e| format!("Failed to check existing container: {}", e))?;

    if !String::from_utf8_lossy(&output.stdout).trim().is_empty() {
        let _ = Command::new("docker")
            .args(["rm", "-f", CONTAINER_NAME])
            .output();
    }

    let status = Command::new("docker")
        .args([
            "run",
            "-d",
            "--name",
            CONTAINER_NAME,
            "-e",
            &format!("POSTGRES_PASSWORD={}", POSTGRES_PASSWORD),
            "-e",
            &format!("POSTGRES_DB={}", DATABASE_NAME),
            "-p",
            &format!("{}:5432", POSTGRES_PORT),
            "postgres:16-alpine",
        ])
        .status()
        .map_err(|e| format!("Failed to start container: {}", e))?;

    if !status.success() {
        return Err("Failed to start PostgreSQL container".to_string());
    }
    Ok(())
}

pub fn stop_postgres_container() {
    let _ = Command::new("docker")
        .args(["rm", "-f", CONTAINER_NAME])
        .output();
}

pub async fn wait_for_postgres() -> Result<PgPool, String> {
    for attempt in 1..=30 {
        match PgPoolOptions::new()
            .max_connections(60)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&database_url())
            .await
        {
            Ok(pool) => {
                if sqlx::query("SELECT 1").fetch_one(&pool).await.is_ok() {
                    println!("✅ PostgreSQL ready after {} attempts", attempt);
                    return Ok(pool);
                }
            }
            Err(_) => {
                if attempt % 5 == 0 {
                    println!("⏳ Waiting for PostgreSQL... (attempt {})", attempt);
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    Err("PostgreSQL did not become ready in time".to_string())
}

pub struct TestContext {
    pub pool: PgPool,
}

impl TestContext {
    pub async fn setup() -> Result<Self, String> {
        start_postgres_container()?;
        let pool = wait_for_postgres().await?;
        Ok(Self { pool })
    }

    /// A router with a fresh provisioned-tenant cache over the shared pool.
    pub fn router(&self) -> ConnectionRouter {
        ConnectionRouter::from_pool(self.pool.clone())
    }

    /// A router over its own tiny pool.
    pub async fn router_with_pool_size(&self, max: u32, acquire_timeout: Duration) -> ConnectionRouter {
        let pool = PgPoolOptions::new()
            .max_connections(max)
            .acquire_timeout(acquire_timeout)
            .connect(&database_url())
            .await
            .expect("small pool should connect");
        ConnectionRouter::from_pool(pool)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        stop_postgres_container();
        println!("🧹 Cleaned up PostgreSQL container");
    }
}

pub fn tenant(raw: &str) -> TenantId {
    TenantId::normalize(raw).expect("test tenant should be valid")
}

pub async fn schema_count(pool: &PgPool, tenant: &TenantId) -> i64 {
    sqlx::query_scalar(
        "SELECT count(*) FROM information_schema.schemata WHERE schema_name = $1",
    )
    .bind(tenant.as_str())
    .fetch_one(pool)
    .await
    .expect("schema count query")
}
