//! Register and login across tenants.

use super::common::*;
use axum::http::StatusCode;
use serde_json::json;

async fn schema_count(ctx: &TestContext, schema: &str) -> i64 {
    sqlx::query_scalar("SELECT count(*) FROM information_schema.schemata WHERE schema_name = $1")
        .bind(schema)
        .fetch_one(&ctx.pool)
        .await
        .unwrap()
}

pub async fn test_register_login_provisions_tenant(ctx: &TestContext) {
    println!("  🧪 test_register_login_provisions_tenant");

    let (status, body) = ctx
        .send(post_json(
            "/auth/register",
            "acme",
            json!({"name": "Jane", "email": "jane@x.io", "password": "s3cret"}),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(schema_count(ctx, "tenant_acme").await, 1);

    let (status, body) = ctx
        .send(post_json(
            "/auth/login",
            "acme",
            json!({"email": "jane@x.io", "password": "s3cret"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = ctx.send(get_with_token("/api/users/me", "acme", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["tenantId"], "tenant_acme");
    assert_eq!(me["role"], "USER");
    assert_eq!(me["userId"], body["user"]["id"]);

    println!("     ✓ Registration provisioned tenant_acme and login minted a tenant token");
}

pub async fn test_duplicate_registration(ctx: &TestContext) {
    println!("  🧪 test_duplicate_registration");

    let body = json!({"name": "Jane", "email": "jane@x.io", "password": "s3cret"});
    let (status, response) = ctx.send(post_json("/auth/register", "acme", body.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "DUPLICATE_USER");

    let (status, _) = ctx.send(post_json("/auth/register", "globex", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(schema_count(ctx, "tenant_globex").await, 1);

    println!("     ✓ Duplicate rejected in acme, accepted in globex");
}

pub async fn test_users_isolated_between_tenants(ctx: &TestContext) {
    println!("  🧪 test_users_isolated_between_tenants");

    let (_, login) = ctx
        .send(post_json(
            "/auth/login",
            "globex",
            json!({"email": "jane@x.io", "password": "s3cret"}),
        ))
        .await;
    let token = login["token"].as_str().unwrap();

    let (status, users) = ctx.send(get_with_token("/api/users", "globex", token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 1);

    let (status, _) = ctx.send(get_with_token("/api/users", "acme", token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    println!("     ✓ Token and data stay inside their tenant");
}

pub async fn run_all_tests(ctx: &TestContext) {
    println!("\n🔐 Auth Flow Tests");
    test_register_login_provisions_tenant(ctx).await;
    test_duplicate_registration(ctx).await;
    test_users_isolated_between_tenants(ctx).await;
}
