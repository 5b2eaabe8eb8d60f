//! Request middleware.

pub mod auth;
pub mod tenant;

pub use auth::require_bearer;
pub use tenant::bind_tenant;
