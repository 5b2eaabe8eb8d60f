use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use tessera_tenant::TenantContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Bearer token authentication.
///
/// Verifies `Authorization: Bearer <token>`, requires the token's tenant to
/// equal the request's tenant, and places the verified
/// [`tessera_token::Claims`] into the request extensions.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = {
        let token = bearer_token(req.headers()).ok_or(ApiError::MissingToken)?;
        state.tokens().verify(token)?
    };

    let request_tenant = TenantContext::current();
    if claims.tenant_id != request_tenant {
        tracing::warn!(
            token_tenant = %claims.tenant_id,
            request_tenant = %request_tenant,
            "token presented to another tenant"
        );
        return Err(ApiError::TenantMismatch {
            token_tenant: claims.tenant_id.to_string(),
            request_tenant: request_tenant.to_string(),
        });
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
