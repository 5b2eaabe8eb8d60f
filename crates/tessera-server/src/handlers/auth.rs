//! Registration and login.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use tessera_core::TenantId;
use tessera_pg::NewUser;

use crate::api_types::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::error::ApiError;
use crate::password;
use crate::state::AppState;

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(req) = payload?;
    let name = required("name", req.name.trim())?;
    let email = required("email", req.email.trim())?;
    let password = required("password", &req.password)?;
    let password_hash = password::hash(&tenant, password.to_string()).await?;

    let user = state
        .users()
        .register(
            &tenant,
            NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// `POST /auth/login`
///
/// Unknown email and wrong password are indistinguishable to the caller,
/// in the response and in the password work done.
pub async fn login(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;
    let email = required("email", req.email.trim())?;
    let password = required("password", &req.password)?;

    let user = state.users().find_by_email(&tenant, email).await?;
    let stored = user.as_ref().map(|u| u.password_hash.clone());
    let matched = password::check_login(&tenant, password.to_string(), stored).await?;

    let Some(user) = user.filter(|_| matched) else {
        tracing::info!(tenant = %tenant, "login rejected");
        return Err(ApiError::InvalidCredentials);
    };

    let token = state
        .tokens()
        .issue(&user.id.to_string(), &tenant, user.role)?;

    tracing::info!(tenant = %tenant, user_id = %user.id, "login succeeded");
    Ok(Json(LoginResponse {
        token: token.into_string(),
        expires_in: state.tokens().ttl().num_seconds(),
        user: user.into(),
    }))
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    if value.is_empty() {
        Err(ApiError::BadRequest(format!("{field} is required")))
    } else {
        Ok(value)
    }
}
