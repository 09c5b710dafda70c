//! API client for communicating with the open-market REST API.
//!
//! This module provides the `ApiClient` struct: a generic request executor
//! with a bounded wait time, a bearer-auth wrapper over it, and the
//! refresh-and-retry flow that renews an expired access token exactly once
//! before replaying the failed request.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::SessionStore;
use crate::config::Config;
use crate::models::{LoginResponse, RefreshResponse, SignupRequest, User};

use super::error::ApiError;
use super::request::{Body, FormField, FormValue, Request, ResponseBody};

// ============================================================================
// Constants
// ============================================================================

/// Login endpoint; returns the token pair and the user profile.
const LOGIN_PATH: &str = "/accounts/login/";

/// Token refresh endpoint; exchanges the refresh token for a new access
/// token, unauthenticated.
const TOKEN_REFRESH_PATH: &str = "/accounts/token/refresh/";

const SIGNUP_PATH: &str = "/accounts/signup/";

const VALIDATE_USERNAME_PATH: &str = "/accounts/validate-username/";

const VALIDATE_COMPANY_NUMBER_PATH: &str = "/accounts/validate-company-registration-number/";

/// API client for the open-market service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling, and clones share the session store and the refresh lock.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    store: Arc<dyn SessionStore>,
    refresh_lock: Arc<tokio::sync::Mutex<()>>,
}

impl ApiClient {
    /// Create a client against the production API.
    pub fn new(store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        Self::with_config(Config::default(), store)
    }

    pub fn with_config(config: Config, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            store,
            refresh_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// The session store this client reads credentials from.
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    // ===== Account Endpoints =====

    /// Log in and persist the returned tokens and profile.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let req = Request::post(LOGIN_PATH).json(json!({
            "username": username,
            "password": password,
        }));
        let login: LoginResponse = self.request_json(&req).await?;

        self.store.set_tokens(&login.access, Some(&login.refresh));
        self.store.set_user(&login.user);
        debug!(username = %login.user.username, "logged in");
        Ok(login.user)
    }

    /// Drop the session. Purely local; the API has no logout endpoint.
    pub fn logout(&self) {
        self.store.clear();
        debug!("logged out");
    }

    /// Register a new buyer or seller account.
    pub async fn signup(&self, signup: &SignupRequest) -> Result<User, ApiError> {
        let body = serde_json::to_value(signup)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let req = Request::post(SIGNUP_PATH).json(body);
        self.request_json(&req).await
    }

    /// Check that a username is still available.
    pub async fn validate_username(&self, username: &str) -> Result<(), ApiError> {
        let req = Request::post(VALIDATE_USERNAME_PATH).json(json!({ "username": username }));
        self.request(&req).await?;
        Ok(())
    }

    /// Check a seller's company registration number.
    pub async fn validate_company_registration_number(
        &self,
        number: &str,
    ) -> Result<(), ApiError> {
        let req = Request::post(VALIDATE_COMPANY_NUMBER_PATH)
            .json(json!({ "company_registration_number": number }));
        self.request(&req).await?;
        Ok(())
    }

    // ===== Request Execution =====

    /// Perform one request without credentials. No retries at this layer.
    pub async fn request(&self, req: &Request) -> Result<ResponseBody, ApiError> {
        let url = self.build_url(&req.path);
        debug!(method = %req.method, url = %url, "dispatching request");

        let mut builder = self
            .client
            .request(req.method.clone(), &url)
            .timeout(req.timeout.unwrap_or(self.timeout));

        match &req.body {
            Body::Empty => {}
            Body::Json(value) => {
                if req.method == Method::GET || req.has_header(header::CONTENT_TYPE.as_str()) {
                    // explicit content type (or GET): hand over the raw
                    // serialized bytes, header untouched
                    builder = builder.body(value.to_string());
                } else {
                    builder = builder.json(value);
                }
            }
            Body::Form(fields) => {
                // multipart sets its own content type; the boundary must
                // survive untouched
                builder = builder.multipart(Self::build_form(fields)?);
            }
        }

        // caller headers last so an explicit Content-Type wins
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(ApiError::from)?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let text = response.text().await.map_err(ApiError::from)?;

        let body = if content_type.contains("application/json") {
            match serde_json::from_str(&text) {
                Ok(value) => ResponseBody::Json(value),
                Err(e) => {
                    warn!(url = %url, error = %e, "declared JSON body failed to parse");
                    ResponseBody::Text(text)
                }
            }
        } else {
            ResponseBody::Text(text)
        };

        if !status.is_success() {
            return Err(ApiError::from_response(status, &body));
        }

        Ok(body)
    }

    /// Perform an authenticated request, renewing the access token and
    /// retrying once if the server rejects it as expired.
    ///
    /// Fails fast with `Unauthenticated` when no access token is stored -
    /// no network call is made in that case.
    pub async fn auth_request(&self, req: &Request) -> Result<ResponseBody, ApiError> {
        let token = self
            .store
            .access_token()
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Unauthenticated)?;

        match self.execute_with_token(req, &token).await {
            Err(err) if err.is_token_expired() => {
                debug!(path = %req.path, "access token rejected, refreshing");
                let fresh = self.refresh_access_token(&token).await?;
                // the retry's outcome is returned as-is; never retried again
                self.execute_with_token(req, &fresh).await
            }
            other => other,
        }
    }

    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        req: &Request,
    ) -> Result<T, ApiError> {
        self.request(req).await?.decode()
    }

    pub(crate) async fn auth_request_json<T: DeserializeOwned>(
        &self,
        req: &Request,
    ) -> Result<T, ApiError> {
        self.auth_request(req).await?.decode()
    }

    async fn execute_with_token(
        &self,
        req: &Request,
        token: &str,
    ) -> Result<ResponseBody, ApiError> {
        // a caller-supplied Authorization header is never overwritten
        if req.has_header(header::AUTHORIZATION.as_str()) {
            return self.request(req).await;
        }
        let authed = req
            .clone()
            .header(header::AUTHORIZATION.as_str(), format!("Bearer {token}"));
        self.request(&authed).await
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Concurrent callers serialize on `refresh_lock`: the first performs
    /// the exchange, later arrivals observe the already-rotated token and
    /// skip their own. Any failure in here clears the whole session.
    async fn refresh_access_token(&self, stale_token: &str) -> Result<String, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.store.access_token().filter(|t| !t.is_empty()) {
            if current != stale_token {
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.store.refresh_token().filter(|t| !t.is_empty()) else {
            warn!("no refresh token available, clearing session");
            self.store.clear();
            return Err(ApiError::SessionExpired);
        };

        let req = Request::post(TOKEN_REFRESH_PATH).json(json!({ "refresh": refresh_token }));
        let refreshed: RefreshResponse = match self.request_json(&req).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "token refresh failed, clearing session");
                self.store.clear();
                return Err(ApiError::SessionExpired);
            }
        };

        self.store
            .set_tokens(&refreshed.access, refreshed.refresh.as_deref());
        debug!("access token refreshed");
        Ok(refreshed.access)
    }

    // ===== URL Handling =====

    /// Pagination `next`/`previous` values are absolute URLs; everything
    /// else is a path under the base URL.
    fn build_url(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            return path_or_url.to_string();
        }
        if path_or_url.starts_with('/') {
            format!("{}{}", self.base_url, path_or_url)
        } else {
            format!("{}/{}", self.base_url, path_or_url)
        }
    }

    /// Build an endpoint URL from path segments and query pairs, with
    /// proper percent-encoding (seller names are arbitrary text).
    pub(crate) fn endpoint_url(
        &self,
        segments: &[&str],
        pairs: &[(&str, String)],
    ) -> Result<String, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid base URL: {e}")))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidRequest("base URL cannot be a base".into()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
            // trailing slash, DRF-style
            path.push("");
        }
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key, value);
            }
        }
        Ok(url.as_str().to_string())
    }

    fn build_form(fields: &[FormField]) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for field in fields {
            form = match &field.value {
                FormValue::Text(text) => form.text(field.name.clone(), text.clone()),
                FormValue::File {
                    data,
                    filename,
                    mime,
                } => {
                    let part = reqwest::multipart::Part::bytes(data.clone())
                        .file_name(filename.clone())
                        .mime_str(mime)
                        .map_err(|e| {
                            ApiError::InvalidRequest(format!("bad mime type {mime:?}: {e}"))
                        })?;
                    form.part(field.name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemorySessionStore;

    fn client() -> ApiClient {
        let config = Config {
            base_url: "https://api.example.com/services/open-market".into(),
            ..Config::default()
        };
        ApiClient::with_config(config, Arc::new(MemorySessionStore::new())).unwrap()
    }

    #[test]
    fn build_url_joins_paths_and_passes_absolute_urls() {
        let client = client();
        assert_eq!(
            client.build_url("/products/"),
            "https://api.example.com/services/open-market/products/"
        );
        assert_eq!(
            client.build_url("cart/"),
            "https://api.example.com/services/open-market/cart/"
        );
        assert_eq!(
            client.build_url("https://api.example.com/services/open-market/products/?page=2"),
            "https://api.example.com/services/open-market/products/?page=2"
        );
    }

    #[test]
    fn endpoint_url_encodes_segments_and_query() {
        let client = client();
        let url = client
            .endpoint_url(&["한글상점", "products"], &[("page", "2".to_string())])
            .unwrap();
        assert_eq!(
            url,
            "https://api.example.com/services/open-market/%ED%95%9C%EA%B8%80%EC%83%81%EC%A0%90/products/?page=2"
        );

        let url = client
            .endpoint_url(&["products"], &[("search", "green tea".to_string())])
            .unwrap();
        assert!(url.ends_with("/products/?search=green+tea"));
    }
}
