//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use atrium_auth::AuthService;
use reqwest::StatusCode;
use url::Url;

use crate::error::{Error, ErrorResponse, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Atrium API client.
///
/// Attaches a bearer token from the session store to every request and,
/// on a 401 response, performs one transparent token refresh before
/// resending the original request.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use atrium_auth::{AuthService, create_memory_session_store};
/// use atrium_client::ApiClient;
///
/// # async fn example() -> atrium_client::Result<()> {
/// let auth = Arc::new(AuthService::new(
///     "http://localhost:8080",
///     create_memory_session_store(),
/// )?);
/// let client = ApiClient::builder()
///     .base_url("http://localhost:8080")
///     .auth(auth)
///     .build()?;
///
/// let me: serde_json::Value = client.get("users/me").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    auth: Arc<AuthService>,
}

/// Per-request retry context.
///
/// Lives only for the duration of one logical request, replacing the
/// mutate-a-flag-on-the-transport-object pattern.
#[derive(Debug, Default)]
struct Attempt {
    retried: bool,
}

impl ApiClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build a URL for an API path.
    fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    async fn access_token(&self) -> Option<String> {
        self.inner
            .auth
            .store()
            .load()
            .await
            .ok()
            .and_then(|state| state.access_token)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Make a GET request.
    pub async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let response = self
            .send_with_retry(|| self.inner.http.get(url.clone()))
            .await?;
        Self::handle_response(response).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self
            .send_with_retry(|| self.inner.http.get(url.clone()).query(query))
            .await?;
        Self::handle_response(response).await
    }

    /// Make a POST request.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self
            .send_with_retry(|| self.inner.http.post(url.clone()).json(body))
            .await?;
        Self::handle_response(response).await
    }

    /// Make a PUT request.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self
            .send_with_retry(|| self.inner.http.put(url.clone()).json(body))
            .await?;
        Self::handle_response(response).await
    }

    /// Make a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        let response = self
            .send_with_retry(|| self.inner.http.delete(url.clone()))
            .await?;

        if !response.status().is_success() {
            return Err(Self::extract_error(response).await);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Retry-on-401 core
    // ─────────────────────────────────────────────────────────────────────────

    /// Send a request, refreshing the token and retrying once on 401.
    ///
    /// The first 401 triggers a refresh: on success the request is rebuilt
    /// with the updated token and resent; on failure the session is logged
    /// out and the original 401 error propagates. A 401 on the retried
    /// request is returned as-is — never a second refresh.
    async fn send_with_retry<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = Attempt::default();

        loop {
            let mut request = build().timeout(self.inner.timeout);
            if let Some(token) = self.access_token().await {
                request = request.bearer_auth(token);
            }

            let response = request.send().await?;

            if response.status() == StatusCode::UNAUTHORIZED && !attempt.retried {
                attempt.retried = true;
                let original = Self::extract_error(response).await;

                match self.inner.auth.refresh_token().await {
                    Ok(Some(_)) => {
                        // New tokens are already persisted; the rebuilt
                        // request picks the fresh one up from the store.
                        tracing::debug!("Got 401, retrying with refreshed token");
                        continue;
                    }
                    Ok(None) | Err(_) => {
                        tracing::warn!("Token refresh failed after 401, logging out");
                        if let Err(e) = self.inner.auth.logout().await {
                            tracing::debug!(error = %e, "Logout after failed refresh errored");
                        }
                        return Err(original);
                    }
                }
            }

            return Ok(response);
        }
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::extract_error(response).await)
        }
    }

    /// Extract an error from a failed response.
    async fn extract_error(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(err) => {
                if status == 401 {
                    Error::Auth(err.message)
                } else {
                    Error::Api {
                        status,
                        code: err.code,
                        message: err.message,
                    }
                }
            }
            Err(_) if status == 401 => Error::Auth(format!("HTTP {}", status)),
            Err(_) => Error::Api {
                status,
                code: "unknown".to_string(),
                message: format!("HTTP {}", status),
            },
        }
    }
}

/// Builder for creating an [`ApiClient`].
pub struct ClientBuilder {
    base_url: Option<String>,
    auth: Option<Arc<AuthService>>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            auth: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the auth service used for bearer tokens and refresh.
    pub fn auth(mut self, auth: Arc<AuthService>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ApiClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;
        let auth = self
            .auth
            .ok_or_else(|| Error::Config("auth service is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("atrium-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                auth,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
