//! HTTP client for the portal REST API.
//!
//! Provides [`ApiClient`], which authenticates with the portal's session
//! cookie, attaches the anti-forgery token to every mutating request, and
//! retries once through a fallback transport when the primary one fails to
//! deliver a request. Domain operations live in [`api`]; the [`PortalApi`]
//! trait is the seam the upload and move services are written against.

pub mod api;

use portal_core::config::FALLBACK_TIMEOUT_SECS;
use portal_core::csrf::{CSRF_COOKIE_NAME, CSRF_HEADER_NAME};
use portal_core::{discover_csrf_token, ClientConfig, CsrfSource, CsrfToken, PortalError, PortalResult};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::OnceCell;

pub use api::PortalApi;

/// Prefix all REST endpoints live under.
pub const API_PREFIX: &str = "/api";

/// HTTP client for the portal API.
#[derive(Debug)]
pub struct ApiClient {
    primary: Client,
    fallback: Option<Client>,
    base_url: String,
    csrf_page: String,
    session_cookie: Option<String>,
    csrf: OnceCell<CsrfToken>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> PortalResult<Self> {
        config.validate()?;

        let primary = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortalError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let fallback = if config.fallback_enabled {
            Some(
                Client::builder()
                    .http1_only()
                    .pool_max_idle_per_host(0)
                    .timeout(Duration::from_secs(FALLBACK_TIMEOUT_SECS))
                    .build()
                    .map_err(|e| {
                        PortalError::Config(format!("Failed to create fallback HTTP client: {}", e))
                    })?,
            )
        } else {
            None
        };

        let csrf = match &config.csrf_token {
            Some(token) => OnceCell::new_with(Some(CsrfToken::new(
                token.clone(),
                CsrfSource::Configured,
            ))),
            None => OnceCell::new(),
        };

        Ok(Self {
            primary,
            fallback,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            csrf_page: config.csrf_page.clone(),
            session_cookie: config.session_cookie.clone(),
            csrf,
        })
    }

    /// Create client from environment (see [`ClientConfig::from_env`]).
    pub fn from_env() -> PortalResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::new(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Anti-forgery token, fetching the bootstrap page on first use.
    pub async fn csrf_token(&self) -> PortalResult<&CsrfToken> {
        self.csrf
            .get_or_try_init(|| self.discover_csrf_token())
            .await
    }

    async fn discover_csrf_token(&self) -> PortalResult<CsrfToken> {
        let url = self.build_url(&self.csrf_page);
        tracing::debug!(url = %url, "Fetching page for CSRF token");

        let response = self
            .send(|client| Ok(self.apply_cookies(client.get(&url), None)))
            .await?;

        let set_cookies: Vec<String> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect();

        let html = response.text().await.unwrap_or_default();

        let token = discover_csrf_token(set_cookies.iter().map(String::as_str), Some(&html))?;
        tracing::debug!(source = ?token.source(), "CSRF token discovered");
        Ok(token)
    }

    fn apply_cookies(&self, request: RequestBuilder, csrf: Option<&CsrfToken>) -> RequestBuilder {
        let mut cookies = Vec::new();
        if let Some(session) = &self.session_cookie {
            cookies.push(format!("sessionid={}", session));
        }
        if let Some(token) = csrf {
            cookies.push(format!("{}={}", CSRF_COOKIE_NAME, token.value()));
        }
        if cookies.is_empty() {
            request
        } else {
            request.header(header::COOKIE, cookies.join("; "))
        }
    }

    /// Attach session cookie, CSRF header and the Referer the portal checks over HTTPS.
    async fn prepare_mutation(&self) -> PortalResult<impl Fn(RequestBuilder) -> RequestBuilder + '_> {
        let token = self.csrf_token().await?;
        let referer = format!("{}/", self.base_url);
        Ok(move |request: RequestBuilder| {
            self.apply_cookies(request, Some(token))
                .header(CSRF_HEADER_NAME, token.value())
                .header(header::REFERER, referer.as_str())
        })
    }

    /// Send a request, retrying once on the fallback transport after a transport failure.
    ///
    /// `build` is called once per attempt so bodies can be rebuilt for the retry.
    async fn send<F>(&self, build: F) -> PortalResult<Response>
    where
        F: Fn(&Client) -> PortalResult<RequestBuilder>,
    {
        match dispatch(&self.primary, &build).await {
            Err(err) if err.is_transport() => match &self.fallback {
                Some(fallback) => {
                    tracing::warn!(error = %err, "Primary transport failed, retrying with fallback");
                    dispatch(fallback, &build).await
                }
                None => Err(err),
            },
            other => other,
        }
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> PortalResult<T> {
        let url = self.build_url(path);
        let response = self
            .send(|client| {
                let mut request = self.apply_cookies(client.get(&url), None);
                if !query.is_empty() {
                    request = request.query(query);
                }
                Ok(request)
            })
            .await?;
        decode_json(response).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> PortalResult<T> {
        let url = self.build_url(path);
        let prepare = self.prepare_mutation().await?;
        let response = self
            .send(|client| Ok(prepare(client.post(&url).json(body))))
            .await?;
        decode_json(response).await
    }

    /// PATCH JSON body. The response body is ignored.
    pub async fn patch_json<B: serde::Serialize>(&self, path: &str, body: &B) -> PortalResult<()> {
        let url = self.build_url(path);
        let prepare = self.prepare_mutation().await?;
        self.send(|client| Ok(prepare(client.patch(&url).json(body))))
            .await?;
        Ok(())
    }

    /// POST multipart form and deserialize response.
    ///
    /// `form` builds a fresh form for every attempt since a sent form is consumed.
    pub async fn post_multipart<T, F>(&self, path: &str, form: F) -> PortalResult<T>
    where
        T: DeserializeOwned,
        F: Fn() -> PortalResult<reqwest::multipart::Form>,
    {
        let url = self.build_url(path);
        let prepare = self.prepare_mutation().await?;
        let response = self
            .send(|client| Ok(prepare(client.post(&url).multipart(form()?))))
            .await?;
        decode_json(response).await
    }
}

async fn dispatch<F>(client: &Client, build: &F) -> PortalResult<Response>
where
    F: Fn(&Client) -> PortalResult<RequestBuilder>,
{
    let response = build(client)?.send().await.map_err(transport_error)?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(status, &body);
    tracing::debug!(status = status.as_u16(), detail = %detail, "API request failed");
    Err(PortalError::api(status.as_u16(), detail))
}

fn transport_error(err: reqwest::Error) -> PortalError {
    PortalError::Transport {
        message: err.to_string(),
        timeout: err.is_timeout(),
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> PortalResult<T> {
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        PortalError::Decode(format!("Failed to parse response as JSON: {}", e))
    })
}

/// Human-readable message from an error response body.
///
/// Prefers `detail`, then the first field or list message of a validation
/// error, then a generic message carrying the status.
pub fn error_detail(status: StatusCode, body: &str) -> String {
    let generic = || format!("Request failed with status {}", status.as_u16());

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return generic();
    };

    match &value {
        serde_json::Value::Object(map) => {
            if let Some(detail) = map.get("detail").and_then(first_message) {
                return detail;
            }
            map.iter()
                .find_map(|(field, value)| {
                    let message = first_message(value)?;
                    Some(if field == "non_field_errors" {
                        message
                    } else {
                        format!("{}: {}", field, message)
                    })
                })
                .unwrap_or_else(generic)
        }
        other => first_message(other).unwrap_or_else(generic),
    }
}

fn first_message(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => items.iter().find_map(first_message),
        _ => None,
    }
}
