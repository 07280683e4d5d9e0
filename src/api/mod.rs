//! HTTP client wrapper and authenticated-session lifecycle.
//!
//! One configured `reqwest::Client` with a fixed base URL; every outgoing
//! request picks up the bearer token from the injected session store. The
//! read-path failure policy lives here as a single named helper.
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::config::{Config, ConfigError, UnauthorizedPolicy};
use crate::normalize;
use crate::session::{SessionError, SessionStore};

use model::LoginOutcome;

pub mod model;
pub mod resources;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend error {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint path: {0}")]
    Endpoint(String),
    #[error("file I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage failure: {0}")]
    Session(#[from] SessionError),
    #[error("unexpected response shape: {0}")]
    Shape(&'static str),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: SessionStore,
    on_unauthorized: UnauthorizedPolicy,
    pub(crate) default_ceiling: i64,
    pub(crate) product_ceiling: i64,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Builds a client from validated configuration. The base URL is fixed
    /// for the life of the client.
    pub fn from_config(cfg: &Config, session: SessionStore) -> Result<Self, ConfigError> {
        // Url::join drops the last path segment unless the base ends in '/'.
        let mut base = cfg.api.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url =
            Url::parse(&base).map_err(|_| ConfigError::Invalid("api.base_url must be a valid URL"))?;
        Ok(Self::with_base_url(
            base_url,
            session,
            cfg.policy.on_unauthorized,
            cfg.ids.default_ceiling,
            cfg.ids.product_ceiling,
        ))
    }

    pub fn with_base_url(
        base_url: Url,
        session: SessionStore,
        on_unauthorized: UnauthorizedPolicy,
        default_ceiling: i64,
        product_ceiling: i64,
    ) -> Self {
        let http = Client::builder()
            .user_agent("ec-admin/0.1")
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            session,
            on_unauthorized,
            default_ceiling,
            product_ceiling,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|_| ApiError::Endpoint(path.to_string()))
    }

    /// Starts a request against `path`, attaching the bearer token when one
    /// is persisted. Absent token means the request goes out
    /// unauthenticated and the backend decides.
    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        let mut builder = self.http.request(method, url);
        if let Some(token) = self.session.token() {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        Ok(builder)
    }

    /// Builds an authenticated GET without sending it.
    pub fn build_get(&self, path: &str) -> Result<reqwest::Request, ApiError> {
        Ok(self.request(Method::GET, path)?.build()?)
    }

    async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let res = builder.send().await?;
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        if !status.is_success() {
            let message = normalize::error_message(&body).unwrap_or(body);
            return Err(ApiError::Status { status, message });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    pub(crate) async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.execute(self.request(Method::GET, path)?).await
    }

    pub(crate) async fn get_with<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Value, ApiError> {
        self.execute(self.request(Method::GET, path)?.query(query))
            .await
    }

    pub(crate) async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.execute(self.request(Method::POST, path)?.json(body))
            .await
    }

    pub(crate) async fn put(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.execute(self.request(Method::PUT, path)?.json(body))
            .await
    }

    pub(crate) async fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.execute(self.request(Method::PATCH, path)?.json(body))
            .await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.execute(self.request(Method::DELETE, path)?).await
    }

    pub(crate) fn multipart_request(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(self.request(Method::POST, path)?.multipart(form))
    }

    pub(crate) async fn send_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Value, ApiError> {
        self.execute(self.multipart_request(path, form)?).await
    }

    /// The read-path failure policy: dashboards degrade to a safe default
    /// instead of surfacing transport errors. A 401 additionally clears the
    /// session when the configured policy is `force-logout`.
    pub(crate) fn degrade<T>(&self, resource: &'static str, err: ApiError, fallback: T) -> T {
        if err.is_unauthorized() && self.on_unauthorized == UnauthorizedPolicy::ForceLogout {
            warn!(resource, "unauthorized read; clearing session");
            self.session.clear();
        } else {
            warn!(resource, error = %err, "read failed; returning default");
        }
        fallback
    }

    /// Authenticates against `users/login` and persists the session on
    /// success. All transport and auth failures fold into the returned
    /// outcome; this never errors.
    pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        let builder = match self.request(Method::POST, "users/login") {
            Ok(b) => b,
            Err(_) => {
                return LoginOutcome::Failure {
                    message: "Invalid credentials".into(),
                }
            }
        };
        let res = match builder
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
        {
            Ok(res) => res,
            Err(err) => {
                warn!(error = %err, "login request failed");
                return LoginOutcome::Failure {
                    message: "Invalid credentials".into(),
                };
            }
        };

        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        let token = payload
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());

        match token {
            Some(token) => {
                let user = payload.get("user").cloned().unwrap_or(Value::Null);
                match self.session.store(token, &user) {
                    Ok(()) => LoginOutcome::Success,
                    Err(err) => LoginOutcome::Failure {
                        message: format!("session not persisted: {}", err),
                    },
                }
            }
            None if status.is_success() => LoginOutcome::Failure {
                message: "No token received".into(),
            },
            None => LoginOutcome::Failure {
                message: normalize::error_message(&body)
                    .unwrap_or_else(|| "Invalid credentials".into()),
            },
        }
    }

    /// Clears the persisted session. Pure side effect, no network call.
    pub fn logout(&self) {
        self.session.clear();
    }

    /// Synchronous predicate over the persisted token. No expiry check, no
    /// backend verification.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }
}
