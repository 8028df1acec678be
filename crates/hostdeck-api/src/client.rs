// Panel client API HTTP client
//
// Wraps `reqwest::Client` with panel-specific URL construction, auth
// header injection, XSRF handling for cookie sessions, and error-body
// decoding. Endpoint groups (servers, auth) are implemented as inherent
// methods in separate files to keep this module focused on transport.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ErrorResponse;
use crate::transport::TransportConfig;

/// Laravel's readable XSRF cookie; mirrored back in `X-XSRF-TOKEN`.
const XSRF_COOKIE: &str = "XSRF-TOKEN";
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Async client for the panel client API.
///
/// Either API-key authenticated (`Authorization: Bearer ...` on every
/// request) or cookie-session authenticated after [`login`](Self::login).
pub struct PanelClient {
    http: reqwest::Client,
    base_url: Url,
    /// Session cookie jar. `None` for API-key clients.
    cookie_jar: Option<Arc<Jar>>,
}

impl PanelClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build an API-key client.
    ///
    /// Injects `Authorization: Bearer <key>` as a default header.
    pub fn from_api_key(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = default_headers();
        let mut key_value = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, key_value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self {
            http,
            base_url,
            cookie_jar: None,
        })
    }

    /// Build a cookie-session client. Call [`login`](Self::login) before
    /// anything else.
    ///
    /// If the transport config doesn't already carry a cookie jar, one is
    /// created automatically.
    pub fn with_session(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client_with_headers(default_headers())?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self {
            http,
            base_url,
            cookie_jar,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            cookie_jar: None,
        })
    }

    /// Ensure the base URL ends with `/` so relative joins keep any
    /// sub-path the panel is mounted under.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        url.set_query(None);
        Ok(url)
    }

    /// The panel base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether this client authenticates with a session cookie.
    pub fn is_session(&self) -> bool {
        self.cookie_jar.is_some()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"api/client"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── XSRF ─────────────────────────────────────────────────────────

    /// Current XSRF token from the session jar, URL-decoded.
    pub(crate) fn xsrf_token(&self) -> Option<String> {
        let jar = self.cookie_jar.as_ref()?;
        let header = jar.cookies(&self.base_url)?;
        let raw = header.to_str().ok()?;
        raw.split(';')
            .map(str::trim)
            .find(|pair| pair.split_once('=').is_some_and(|(name, _)| name == XSRF_COOKIE))
            .and_then(|pair| url::form_urlencoded::parse(pair.as_bytes()).next())
            .map(|(_, value)| value.into_owned())
    }

    /// Apply the XSRF header to a state-changing session request.
    fn apply_xsrf(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.xsrf_token() {
            Some(token) => {
                trace!("attaching XSRF token");
                builder.header("X-XSRF-TOKEN", token)
            }
            None => builder,
        }
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.apply_xsrf(self.http.post(url).json(body)).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post_no_response(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.apply_xsrf(self.http.post(url)).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    pub(crate) async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = body.chars().take(200).collect::<String>();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    pub(crate) async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    pub(crate) async fn parse_error(
        &self,
        status: reqwest::StatusCode,
        resp: reqwest::Response,
    ) -> Error {
        match status.as_u16() {
            401 if self.is_session() => return Error::SessionExpired,
            401 => return Error::InvalidApiKey,
            // Laravel's CSRF token mismatch.
            419 => return Error::SessionExpired,
            429 => {
                let retry_after_secs = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                return Error::RateLimited { retry_after_secs };
            }
            _ => {}
        }

        let raw = resp.text().await.unwrap_or_default();
        let first = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|body| body.errors.into_iter().next());

        match first {
            Some(entry) => Error::Api {
                status: status.as_u16(),
                message: entry.detail.unwrap_or_else(|| status.to_string()),
                code: entry.code,
            },
            None => Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw.chars().take(200).collect()
                },
                code: None,
            },
        }
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}
