//! Route handlers.

pub mod api;
pub mod auth;
