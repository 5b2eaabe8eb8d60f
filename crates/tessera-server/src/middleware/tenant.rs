use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tessera_tenant::TenantContext;
use tracing::Instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// Resolve the request's tenant and bind it for the rest of the chain.
///
/// The resolved [`tessera_core::TenantId`] is also placed in the request
/// extensions so handlers can pass it on explicitly. An invalid identifier
/// ends the request with 400 before any handler runs.
pub async fn bind_tenant(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let tenant = state.resolver().resolve(req.headers()).map_err(|e| {
        tracing::warn!(error = %e, "rejected tenant identifier");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(tenant.clone());
    let span = tracing::info_span!("tenant", tenant = %tenant);

    Ok(TenantContext::bind(tenant, next.run(req))
        .instrument(span)
        .await)
}
