//! HTTP request pipeline: outbound header injection, inbound renewal.

use std::sync::Arc;

use reqwest::{Method, StatusCode};

use petget_session::SessionContext;

use crate::config::ApiConfig;
use crate::error::{self, ApiError};

/// Tenant-scoping header, matching the backend's tenant interceptor.
pub const TENANT_HEADER: &str = "X-Tenant-ID";

/// Invoked exactly once per terminal authentication failure, after the
/// credential store has been cleared. The embedding application navigates to
/// its login entry point; this library cannot.
pub trait SessionExpiredHook: Send + Sync {
    fn on_session_expired(&self);
}

/// Default hook: log and let the next request fail unauthenticated.
struct LogExpiredHook;

impl SessionExpiredHook for LogExpiredHook {
    fn on_session_expired(&self) {
        tracing::warn!("session expired; no expiry hook registered, not redirecting");
    }
}

/// A describable, re-issuable request. The pipeline may send it twice (once
/// before and once after a renewal), so it is built from owned parts rather
/// than a consumed `reqwest` builder.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Option<serde_json::Value>,
    pub(crate) skip_auth: bool,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            skip_auth: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Set a header explicitly. The outbound stage never overwrites a header
    /// listed here, whatever it is.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Send without session headers. Required for login and refresh, which
    /// must not depend on an existing session; also opts the request out of
    /// the inbound renewal stage.
    pub fn unauthenticated(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

/// Per-request progress through the inbound stage.
///
/// `Send → Complete` is the happy path. A first 401 on a session request
/// moves to `Renew`; renewal success re-enters `Send` with the retried
/// marker set, and every other edge is `Terminal`.
enum RequestState {
    Send { retried: bool },
    Renew {
        stale_token: Option<String>,
        original: reqwest::Response,
    },
    Complete(reqwest::Response),
    Terminal(ApiError),
}

/// The configured HTTP client all backend traffic goes through.
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
    session: SessionContext,
    /// In-flight renewal guard: concurrent 401s queue here instead of each
    /// issuing its own refresh call.
    renewal: tokio::sync::Mutex<()>,
    expiry_hook: Arc<dyn SessionExpiredHook>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, session: SessionContext) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            config,
            http,
            session,
            renewal: tokio::sync::Mutex::new(()),
            expiry_hook: Arc::new(LogExpiredHook),
        })
    }

    pub fn with_expiry_hook(mut self, hook: Arc<dyn SessionExpiredHook>) -> Self {
        self.expiry_hook = hook;
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Run a request through both interceptor stages.
    ///
    /// `Ok` is always a 2xx response; every other outcome is normalized to
    /// one [`ApiError`]. A session request that comes back 401 is renewed
    /// and re-issued at most once; renewal failure or a second 401 clears
    /// the store, fires the expiry hook, and surfaces the 401.
    pub async fn execute(&self, request: ApiRequest) -> Result<reqwest::Response, ApiError> {
        let mut state = RequestState::Send { retried: false };

        loop {
            state = match state {
                RequestState::Send { retried } => {
                    let (response, sent_token) = self.dispatch(&request).await?;

                    if response.status() != StatusCode::UNAUTHORIZED || request.skip_auth {
                        RequestState::Complete(response)
                    } else if retried {
                        tracing::warn!(path = %request.path, "renewed token rejected, expiring session");
                        self.expire_session();
                        RequestState::Terminal(error::from_response(response).await)
                    } else {
                        RequestState::Renew {
                            stale_token: sent_token,
                            original: response,
                        }
                    }
                }

                RequestState::Renew { stale_token, original } => {
                    match self.renew_session(stale_token.as_deref()).await {
                        Ok(()) => RequestState::Send { retried: true },
                        Err(renew_err) => {
                            tracing::warn!(path = %request.path, "token renewal failed: {renew_err}");
                            self.expire_session();
                            // The caller sees the failure of its own request,
                            // not the renewal's.
                            RequestState::Terminal(error::from_response(original).await)
                        }
                    }
                }

                RequestState::Complete(response) => {
                    if response.status().is_success() {
                        return Ok(response);
                    }
                    return Err(error::from_response(response).await);
                }

                RequestState::Terminal(err) => return Err(err),
            };
        }
    }

    /// Build and send one attempt. Returns the access token that was
    /// attached, so the renewal path can tell whether the store has already
    /// moved past it.
    async fn dispatch(
        &self,
        request: &ApiRequest,
    ) -> Result<(reqwest::Response, Option<String>), ApiError> {
        let url = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            request.path
        );
        let mut builder = self.http.request(request.method.clone(), &url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut sent_token = None;
        if !request.skip_auth {
            let session = self.session.session();
            if let Some(token) = &session.access_token {
                if !request.has_header(reqwest::header::AUTHORIZATION.as_str()) {
                    builder = builder.bearer_auth(token);
                    sent_token = Some(token.clone());
                }
            }
            if let Some(tenant) = session.tenant_id() {
                if !request.has_header(TENANT_HEADER) {
                    builder = builder.header(TENANT_HEADER, tenant.as_str());
                }
            }
        }

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok((response, sent_token))
    }

    /// Exchange the stored refresh token for a new access token, coalesced
    /// across concurrent callers.
    ///
    /// Whoever holds the guard re-checks the store first: if the token that
    /// failed is no longer the stored one, a concurrent request already
    /// renewed and this caller only needs to retry.
    async fn renew_session(&self, stale_token: Option<&str>) -> Result<(), ApiError> {
        let _guard = self.renewal.lock().await;

        if let Some(current) = self.session.access_token() {
            if stale_token != Some(current.as_str()) {
                tracing::debug!("renewal already completed by a concurrent request");
                return Ok(());
            }
        }

        let Some(refresh_token) = self.session.refresh_token() else {
            return Err(ApiError::Credential {
                message: "no refresh token available".to_string(),
            });
        };

        let renewed = self.refresh(&refresh_token).await?;

        if renewed.refresh_token.is_some() || renewed.user.is_some() {
            // The backend rotated more than the access token; persist the
            // rotated values and keep the rest as stored.
            let current = self.session.session();
            let identity = renewed
                .user
                .or(current.identity)
                .ok_or_else(|| ApiError::Credential {
                    message: "renewal returned no identity and none is stored".to_string(),
                })?;
            let refresh = renewed.refresh_token.or(current.refresh_token);
            self.session
                .install(&renewed.access_token, refresh.as_deref(), &identity);
        } else {
            self.session.replace_access_token(&renewed.access_token);
        }

        tracing::info!("access token renewed");
        Ok(())
    }

    fn expire_session(&self) {
        self.session.clear();
        self.expiry_hook.on_session_expired();
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}
