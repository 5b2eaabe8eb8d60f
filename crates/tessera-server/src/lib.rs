//! # tessera-server
//!
//! Multi-tenant HTTP service.
//!
//! Each request passes through two layers before reaching a handler:
//!
//! 1. [`middleware::bind_tenant`] resolves the tenant from `X-Project-ID` /
//!    `X-Tenant-ID` and binds it with [`tessera_tenant::TenantContext`] for
//!    the lifetime of the request.
//! 2. [`middleware::require_bearer`] (protected routes only) verifies the
//!    session token and rejects tokens minted for another tenant.
//!
//! Routes:
//!
//! | method | path | auth |
//! |--------|------|------|
//! | POST | `/auth/register` | none |
//! | POST | `/auth/login` | none |
//! | GET | `/api/health` | none |
//! | GET | `/api/tenant-info` | none |
//! | GET | `/api/users` | bearer |
//! | GET | `/api/users/me` | bearer |
//! | GET | `/api/admin/users` | bearer, ADMIN |

pub mod api_types;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod routes;
pub mod server;
pub mod state;

pub use directory::UserDirectory;
pub use error::ApiError;
pub use routes::create_router;
pub use server::TesseraServer;
pub use state::AppState;
