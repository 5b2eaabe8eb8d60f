//! Shared application state.

use std::sync::Arc;
use tessera_core::TesseraConfig;
use tessera_tenant::TenantResolver;
use tessera_token::TokenService;

use crate::directory::UserDirectory;

/// State shared by every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    resolver: TenantResolver,
    tokens: TokenService,
    users: Arc<dyn UserDirectory>,
}

impl AppState {
    /// Build state from configuration. The token signing key is generated
    /// here, once per process.
    pub fn new(config: &TesseraConfig, users: Arc<dyn UserDirectory>) -> Self {
        Self::from_parts(
            TenantResolver::new(config.tenancy.clone()),
            TokenService::from_config(&config.token),
            users,
        )
    }

    pub fn from_parts(
        resolver: TenantResolver,
        tokens: TokenService,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                resolver,
                tokens,
                users,
            }),
        }
    }

    pub fn resolver(&self) -> &TenantResolver {
        &self.inner.resolver
    }

    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    pub fn users(&self) -> &dyn UserDirectory {
        self.inner.users.as_ref()
    }
}
