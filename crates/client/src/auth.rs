//! Auth operations: login, refresh, logout, validate.

use serde::{Deserialize, Serialize};

use petget_core::UserIdentity;
use petget_session::Session;

use crate::error::ApiError;
use crate::pipeline::{ApiClient, ApiRequest};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    secret: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Successful login body. The identity lives under `user`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Access token lifetime in seconds. Informational; renewal is driven by
    /// 401 responses, not by a timer.
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: UserIdentity,
}

/// Successful refresh body. The backend normally returns only a new access
/// token; rotated refresh tokens and identities are honored when present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserIdentity>,
}

impl ApiClient {
    /// Authenticate and install the resulting session.
    ///
    /// Sent without session headers: logging in must not depend on (or be
    /// poisoned by) whatever session is currently stored. The store is only
    /// written on success.
    pub async fn login(&self, email: &str, secret: &str) -> Result<Session, ApiError> {
        let body = serde_json::to_value(LoginRequest { email, secret })
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        let request = ApiRequest::post("/auth/login").unauthenticated().json(body);

        let response = self.execute(request).await.map_err(as_credential_error)?;
        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        self.session()
            .install(&body.access_token, Some(&body.refresh_token), &body.user);
        tracing::info!(tenant = %body.user.tenant_id, "login succeeded");

        Ok(self.session().session())
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// Deliberately does not touch the credential store: the inbound stage
    /// owns what gets persisted after a renewal.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ApiError> {
        let body = serde_json::to_value(RefreshRequest { refresh_token })
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        let request = ApiRequest::post("/auth/refresh").unauthenticated().json(body);

        // Boxed because the pipeline's renewal path re-enters `execute`
        // through this call, and a recursive async fn needs indirection.
        let response = Box::pin(self.execute(request))
            .await
            .map_err(as_credential_error)?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Notify the backend (best effort) and drop the session.
    ///
    /// The notification is skipped entirely when no access token is stored;
    /// its failure is logged, never propagated. The store is cleared
    /// unconditionally.
    pub async fn logout(&self) {
        if self.session().access_token().is_some() {
            match self.execute(ApiRequest::post("/auth/logout")).await {
                Ok(_) => tracing::debug!("backend notified of logout"),
                Err(err) => tracing::warn!("logout notification failed: {err}"),
            }
        }
        self.session().clear();
    }

    /// Whether the stored session is still accepted by the backend.
    ///
    /// False without a network call when no access token is stored; network
    /// and server errors also read as "not valid". Never fails.
    pub async fn validate(&self) -> bool {
        if self.session().access_token().is_none() {
            return false;
        }

        match self.execute(ApiRequest::get("/auth/validate")).await {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!("session validation failed: {err}");
                false
            }
        }
    }
}

/// Backend rejections of login/refresh are credential errors; transport and
/// decoding failures pass through unchanged.
fn as_credential_error(err: ApiError) -> ApiError {
    match err {
        ApiError::Unauthorized { message }
        | ApiError::Forbidden { message }
        | ApiError::Api { message, .. } => ApiError::Credential { message },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_decodes_backend_shape() {
        let json = r#"{
            "accessToken": "t1",
            "refreshToken": "r1",
            "tokenType": "Bearer",
            "expiresIn": 3600,
            "user": {
                "id": 1,
                "name": "Ana Souza",
                "email": "ana@petget.com",
                "role": "ADMIN",
                "tenantId": "tenant-a"
            }
        }"#;

        let body: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.access_token, "t1");
        assert_eq!(body.user.tenant_id.as_str(), "tenant-a");
        assert_eq!(body.expires_in, Some(3600));
    }

    #[test]
    fn refresh_response_tolerates_minimal_body() {
        let body: RefreshResponse = serde_json::from_str(r#"{"accessToken":"t2"}"#).unwrap();
        assert_eq!(body.access_token, "t2");
        assert!(body.refresh_token.is_none());
        assert!(body.user.is_none());
    }

    #[test]
    fn backend_rejections_become_credential_errors() {
        let err = as_credential_error(ApiError::Unauthorized {
            message: "Credenciais inválidas".to_string(),
        });
        assert_eq!(
            err,
            ApiError::Credential {
                message: "Credenciais inválidas".to_string()
            }
        );

        let net = as_credential_error(ApiError::Network("timeout".to_string()));
        assert_eq!(net, ApiError::Network("timeout".to_string()));
    }
}
