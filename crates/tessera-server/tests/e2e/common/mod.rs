//! Docker PostgreSQL and HTTP helpers for the tessera-server E2E tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tessera_core::TesseraConfig;
use tessera_pg::{ConnectionRouter, UserRepository};
use tessera_server::{AppState, create_router};
use tower::ServiceExt;

pub const CONTAINER_NAME: &str = "tessera_server_test_postgres";
pub const POSTGRES_PORT: u16 = 5435;
pub const POSTGRES_PASSWORD: &str = "tessera_test_password";
pub const DATABASE_NAME: &str = "tessera_test";

pub fn database_url() -> String {
    format!(
        "postgres://postgres:{}@localhost:{}/{}",
        POSTGRES_PASSWORD, POSTGRES_PORT, DATABASE_NAME
    )
}

pub fn start_postgres_container() -> Result<(), String> {
    let _ = Command::new("docker")
        .args(["rm", "-f", CONTAINER_NAME])
        .output();

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
        if let Ok(pool) = PgPool::connect(&database_url()).await
            && sqlx::query("SELECT 1").fetch_one(&pool).await.is_ok()
        {
            println!("✅ PostgreSQL ready after {} attempts", attempt);
            return Ok(pool);
        }
        if attempt % 5 == 0 {
            println!("⏳ Waiting for PostgreSQL... (attempt {})", attempt);
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    Err("PostgreSQL did not become ready in time".to_string())
}

pub struct TestContext {
    pub pool: PgPool,
    pub app: Router,
}

impl TestContext {
    pub async fn setup() -> Result<Self, String> {
        start_postgres_container()?;
        let pool = wait_for_postgres().await?;

        let router = ConnectionRouter::from_pool(pool.clone());
        router
            .provisioner()
            .prepare_default()
            .await
            .map_err(|e| format!("Failed to prepare public partition: {}", e))?;

        let state = AppState::new(
            &TesseraConfig::default(),
            Arc::new(UserRepository::new(router)),
        );
        Ok(Self {
            pool,
            app: create_router(state),
        })
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        stop_postgres_container();
        println!("🧹 Cleaned up PostgreSQL container");
    }
}

pub fn post_json(uri: &str, project: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Project-ID", project)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_with_token(uri: &str, project: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-Project-ID", project)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}
