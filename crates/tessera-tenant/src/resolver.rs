//! Tenant resolution from request headers.

use http::HeaderMap;
use tessera_core::{TenancyConfig, TenantError, TenantId};

/// Derives the tenant of a request from its headers.
///
/// The project header wins over the legacy tenant header. A header that is
/// missing, empty or whitespace-only counts as absent; when both are absent
/// the request belongs to the default `public` tenant. Present values are
/// normalized and validated, never trimmed or stripped.
#[derive(Debug, Clone, Default)]
pub struct TenantResolver {
    config: TenancyConfig,
}

impl TenantResolver {
    pub fn new(config: TenancyConfig) -> Self {
        Self { config }
    }

    /// Resolve the normalized tenant for a request.
    pub fn resolve(&self, headers: &HeaderMap) -> Result<TenantId, TenantError> {
        match self.raw_identifier(headers)? {
            Some(raw) => TenantId::normalize(raw),
            None => Ok(TenantId::public()),
        }
    }

    /// The raw identifier chosen by header precedence, before normalization.
    pub fn raw_identifier<'h>(
        &self,
        headers: &'h HeaderMap,
    ) -> Result<Option<&'h str>, TenantError> {
        for name in self.config.headers() {
            let Some(value) = headers.get(name) else {
                continue;
            };
            let value = value
                .to_str()
                .map_err(|_| TenantError::UnreadableHeader {
                    header: name.to_string(),
                })?;
            if value.trim().is_empty() {
                continue;
            }
            return Ok(Some(value));
        }
        Ok(None)
    }

    pub fn config(&self) -> &TenancyConfig {
        &self.config
    }
}
