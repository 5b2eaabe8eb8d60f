//! Tenant-scoped API.

use axum::Json;
use axum::extract::{Extension, State};
use chrono::Utc;
use tessera_core::TenantId;
use tessera_tenant::TenantContext;
use tessera_token::Claims;

use crate::api_types::{AccountView, HealthResponse, MeResponse, TenantInfoResponse, UserView};
use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
        tenant: TenantContext::current().to_string(),
    })
}

/// `GET /api/tenant-info`
pub async fn tenant_info() -> Json<TenantInfoResponse> {
    let tenant = TenantContext::current();
    Json(TenantInfoResponse {
        message: format!("Hello from tenant: {tenant}"),
        current_tenant: tenant.to_string(),
        timestamp: Utc::now().timestamp_millis(),
    })
}

/// `GET /api/users`
pub async fn list_users(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let users = state.users().list(&tenant).await?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

/// `GET /api/users/me`
pub async fn me(Extension(claims): Extension<Claims>) -> Json<MeResponse> {
    Json(MeResponse::from(&claims))
}

/// `GET /api/admin/users`
pub async fn admin_users(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<AccountView>>, ApiError> {
    if !claims.role.is_admin() {
        return Err(ApiError::Forbidden("administrator role required".to_string()));
    }
    let users = state.users().list(&tenant).await?;
    Ok(Json(users.into_iter().map(AccountView::from).collect()))
}
