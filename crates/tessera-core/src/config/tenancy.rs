//! Tenancy configuration.
//!
//! Defines which request headers carry the tenant identifier. The partition
//! naming convention (`tenant_` prefix, `public` default) is fixed and lives
//! in [`crate::tenant`].

use serde::{Deserialize, Serialize};

/// Header names consulted when resolving the tenant of a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenancyConfig {
    /// Project-scoped header. Takes priority when present.
    #[serde(default = "default_project_header")]
    pub project_header: String,

    /// Legacy tenant header, consulted when the project header is absent.
    #[serde(default = "default_tenant_header")]
    pub tenant_header: String,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            project_header: default_project_header(),
            tenant_header: default_tenant_header(),
        }
    }
}

impl TenancyConfig {
    /// Headers in precedence order.
    pub fn headers(&self) -> [&str; 2] {
        [&self.project_header, &self.tenant_header]
    }
}

fn default_project_header() -> String {
    "X-Project-ID".to_string()
}

fn default_tenant_header() -> String {
    "X-Tenant-ID".to_string()
}
