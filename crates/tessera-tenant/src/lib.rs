//! # tessera-tenant
//!
//! Binding of inbound requests to exactly one tenant.
//!
//! ```text
//! request headers ──► TenantResolver::resolve ──► TenantId
//!                                                   │
//!                     TenantContext::bind(id, handler future)
//!                                                   │
//!                     handler ──► TenantContext::current()
//! ```
//!
//! The binding is a tokio task-local scoped to the handler future, so it is
//! gone on every exit path and cannot leak to the next request served by the
//! same worker thread.

pub mod context;
pub mod resolver;

pub use context::TenantContext;
pub use resolver::TenantResolver;
pub use tessera_core::{TenantError, TenantId};
