//! Tenant identifiers.
//!
//! A raw identifier arrives from request metadata (e.g. `acme`). Before it is
//! used anywhere near the database it is normalized into a schema name
//! (`tenant_acme`), or into the default `public` partition, and checked
//! against a strict allow-list. [`TenantId`] can only be built through that
//! path, so holding one means the value is safe to use as a Postgres
//! identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Normalized identifier of the default, unscoped partition.
pub const DEFAULT_TENANT: &str = "public";

/// Prefix carried by every tenant schema name.
pub const SCHEMA_PREFIX: &str = "tenant_";

/// Postgres truncates identifiers longer than this (NAMEDATALEN - 1).
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Errors raised while normalizing or validating a tenant identifier.
///
/// Every variant is an "invalid tenant" failure: the request is rejected and
/// the identifier is never auto-corrected beyond [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenantError {
    /// The identifier is empty, or has nothing after the schema prefix.
    #[error("tenant identifier is empty")]
    Empty,

    /// The identifier contains a character outside `[a-z0-9_]` after case-folding.
    #[error("tenant identifier {value:?} contains invalid character {character:?}")]
    InvalidCharacters { value: String, character: char },

    /// The normalized identifier exceeds the Postgres identifier limit.
    #[error("tenant identifier is {len} bytes long, maximum is {max}")]
    TooLong { len: usize, max: usize },

    /// A value presented as normalized does not carry the schema prefix.
    #[error("tenant identifier {0:?} is not normalized")]
    NotNormalized(String),

    /// A tenant header could not be read as visible ASCII.
    #[error("header {header} does not contain a readable tenant identifier")]
    UnreadableHeader { header: String },
}

/// A normalized, validated tenant identifier.
///
/// The inner string is either [`DEFAULT_TENANT`] or `tenant_<name>` where the
/// whole value matches `[a-z0-9_]{1,63}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// The default tenant. Its partition always exists.
    pub fn public() -> Self {
        Self(DEFAULT_TENANT.to_string())
    }

    /// Normalize and validate a raw identifier.
    pub fn normalize(raw: &str) -> Result<Self, TenantError> {
        normalize(raw).map(Self)
    }

    /// The normalized identifier, which is also the schema name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the default `public` partition.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_TENANT
    }

    /// The tenant name without the schema prefix (`acme` for `tenant_acme`).
    pub fn name(&self) -> &str {
        self.0.strip_prefix(SCHEMA_PREFIX).unwrap_or(&self.0)
    }

    /// The identifier as a double-quoted SQL identifier.
    ///
    /// Validation guarantees the value contains no quote characters, so the
    /// quoting only pins the case.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }

    /// Re-check the allow-list on an existing value.
    pub fn revalidate(&self) -> Result<(), TenantError> {
        validate(&self.0)
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::public()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TenantId {
    type Err = TenantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl TryFrom<String> for TenantId {
    type Error = TenantError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value)
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize a raw tenant identifier into its schema-safe form.
///
/// - `public` (any ASCII case) stays `public`.
/// - A value already carrying the `tenant_` prefix is lower-cased.
/// - Anything else is lower-cased and prefixed with `tenant_`.
///
/// The result is validated with [`validate`]. The function is pure and
/// idempotent: `normalize(normalize(x)?) == normalize(x)`.
pub fn normalize(raw: &str) -> Result<String, TenantError> {
    if raw.is_empty() {
        return Err(TenantError::Empty);
    }

    let lowered = raw.to_ascii_lowercase();
    if lowered == DEFAULT_TENANT {
        return Ok(lowered);
    }

    let normalized = if lowered.starts_with(SCHEMA_PREFIX) {
        lowered
    } else {
        format!("{SCHEMA_PREFIX}{lowered}")
    };

    validate(&normalized)?;
    Ok(normalized)
}

/// Check that a normalized identifier is safe to use as a schema name.
pub fn validate(normalized: &str) -> Result<(), TenantError> {
    if normalized == DEFAULT_TENANT {
        return Ok(());
    }

    if let Some(character) = normalized
        .chars()
        .find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '_'))
    {
        return Err(TenantError::InvalidCharacters {
            value: normalized.to_string(),
            character,
        });
    }

    if normalized.len() > MAX_IDENTIFIER_LEN {
        return Err(TenantError::TooLong {
            len: normalized.len(),
            max: MAX_IDENTIFIER_LEN,
        });
    }

    match normalized.strip_prefix(SCHEMA_PREFIX) {
        None => Err(TenantError::NotNormalized(normalized.to_string())),
        Some("") => Err(TenantError::Empty),
        Some(_) => Ok(()),
    }
}
