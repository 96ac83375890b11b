//! Resolved user/tenant identity.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::id::TenantId;

/// The identity the backend resolves on login.
///
/// This is the `user` object of the login response, persisted alongside the
/// tokens. The tenant scope of every outbound request is derived from
/// `tenant_id` here and nowhere else.
///
/// `last_login_at` is zone-less because the backend emits bare
/// `LocalDateTime` timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub tenant_id: TenantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<NaiveDateTime>,
}
