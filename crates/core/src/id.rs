//! Strongly-typed identifiers shared across the access layer.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Identifier of a tenant (multi-tenant boundary).
///
/// The backend issues opaque string ids (`tenant-a`, ...); this newtype only
/// guarantees the value is non-empty. Every authenticated request is scoped
/// to exactly one of these via the `X-Tenant-ID` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Wrap an already-trusted tenant id (e.g. one decoded from a backend
    /// response). Prefer `FromStr` for values that cross a validation
    /// boundary.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TenantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TenantId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CoreError::invalid_id("TenantId: empty"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<TenantId> for String {
    fn from(value: TenantId) -> Self {
        value.0
    }
}
