//! Route definitions.

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{api, auth};
use crate::middleware::{bind_tenant, require_bearer};
use crate::state::AppState;

/// Create the application router.
///
/// Every route runs inside the tenant middleware; the `/api/users` and
/// `/api/admin` routes additionally require a bearer token for that tenant.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/users", get(api::list_users))
        .route("/api/users/me", get(api::me))
        .route("/api/admin/users", get(api::admin_users))
        .route_layer(from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/api/health", get(api::health))
        .route("/api/tenant-info", get(api::tenant_info))
        .merge(protected)
        .layer(from_fn_with_state(state.clone(), bind_tenant))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
