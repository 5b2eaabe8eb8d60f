//! # tessera-token
//!
//! Signed session tokens binding a user to the tenant they authenticated
//! against.
//!
//! Tokens are compact JWS (HS256) with the payload
//! `{"sub", "tenantId", "role", "iat", "exp", "jti"}`. The signing key is
//! generated once per process, so tokens do not survive a restart and are
//! not accepted by other instances.
//!
//! ```rust,ignore
//! use tessera_token::{Role, TokenService};
//!
//! let service = TokenService::from_config(&config.token);
//! let token = service.issue(&user_id, &tenant, Role::User)?;
//! let claims = service.verify(token.as_str())?;
//! ```

pub mod claims;
pub mod error;
pub mod keys;
pub mod service;

pub use claims::{ClaimField, Claims, Role};
pub use error::TokenError;
pub use keys::SigningKey;
pub use service::{SessionToken, TokenService};
