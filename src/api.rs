//! Authenticated backend HTTP client.
//!
//! [`ApiClient::fetch`] is the single place that builds URLs, attaches the
//! bearer token, performs the request, and turns every outcome into either
//! the response JSON or an [`ApiError`]. Resource modules never talk to
//! `reqwest` directly.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult, GENERIC_REQUEST_ERROR};
use crate::session::SessionStore;
use crate::token;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// A single query-string value before it is rendered to text.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
}

impl QueryValue {
    /// Text form sent on the wire.
    pub fn render(&self) -> String {
        match self {
            QueryValue::Text(s) => s.clone(),
            QueryValue::Int(n) => n.to_string(),
            QueryValue::Float(n) => n.to_string(),
            QueryValue::Bool(b) => b.to_string(),
            QueryValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            QueryValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            QueryValue::Timestamp(ts) => ts.to_rfc3339(),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Text(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Text(v)
    }
}

impl From<&String> for QueryValue {
    fn from(v: &String) -> Self {
        QueryValue::Text(v.clone())
    }
}

macro_rules! query_int {
    ($($t:ty),*) => {
        $(impl From<$t> for QueryValue {
            fn from(v: $t) -> Self {
                QueryValue::Int(v as i64)
            }
        })*
    };
}

query_int!(i32, i64, u32, u16, u8);

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        QueryValue::Float(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

impl From<NaiveDate> for QueryValue {
    fn from(v: NaiveDate) -> Self {
        QueryValue::Date(v)
    }
}

impl From<NaiveDateTime> for QueryValue {
    fn from(v: NaiveDateTime) -> Self {
        QueryValue::DateTime(v)
    }
}

impl From<DateTime<Utc>> for QueryValue {
    fn from(v: DateTime<Utc>) -> Self {
        QueryValue::Timestamp(v)
    }
}

/// Ordered query-string parameters, already rendered to text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl Into<QueryValue>) -> &mut Self {
        self.0.push((key.to_string(), value.into().render()));
        self
    }

    /// Push only when `value` is present and does not render to an empty
    /// string.
    pub fn push_opt<V: Into<QueryValue>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            let rendered = v.into().render();
            if !rendered.trim().is_empty() {
                self.0.push((key.to_string(), rendered));
            }
        }
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<QueryValue>) -> Self {
        self.push(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Request options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Send without a bearer token and skip the 401 session handling. Used
    /// by the login call, which has no session yet.
    pub anonymous: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
            anonymous: false,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    pub fn post(body: Value) -> Self {
        Self::with_method(Method::POST).body(body)
    }

    pub fn put(body: Value) -> Self {
        Self::with_method(Method::PUT).body(body)
    }

    pub fn patch(body: Value) -> Self {
        Self::with_method(Method::PATCH).body(body)
    }

    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Convert a `reqwest::Error` into a user-friendly message.
fn friendly_error(url: &str, err: &reqwest::Error) -> String {
    if err.is_connect() {
        return format!("Cannot reach the server at {url}, try again later");
    }
    if err.is_timeout() {
        return format!("Connection to {url} timed out, try again later");
    }
    if err.is_builder() {
        return format!("Invalid server URL: {url}");
    }
    format!("Network error communicating with {url}: {err}")
}

/// Message for a non-401 failure: the body's `message` string when there is
/// one, the generic message otherwise.
fn error_message_from_body(body_text: &str) -> String {
    serde_json::from_str::<Value>(body_text)
        .ok()
        .and_then(|json| {
            json.get("message")
                .and_then(Value::as_str)
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| GENERIC_REQUEST_ERROR.to_string())
}

/// Percent-encode a caller-supplied value for use as a single path segment.
///
/// Empty, `.` and `..` are rejected because URL parsing would collapse them
/// into a different endpoint.
pub fn path_segment(raw: &str) -> ApiResult<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "." || raw == ".." {
        return Err(ApiError::InvalidRequest(format!(
            "invalid path segment: {raw:?}"
        )));
    }
    Ok(urlencoding::encode(raw).into_owned())
}

fn to_body<B: Serialize>(body: &B) -> ApiResult<Value> {
    serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Backend client. Cheap to clone; clones share the connection pool and the
/// session.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// `base_url + endpoint`, with `query` appended as URL-encoded pairs.
    pub fn build_url(&self, endpoint: &str, query: &QueryParams) -> ApiResult<Url> {
        let raw = format!("{}{}", self.base_url, endpoint);
        let mut url =
            Url::parse(&raw).map_err(|e| ApiError::InvalidRequest(format!("{raw}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url)
    }

    fn build_headers(options: &RequestOptions, token: Option<&str>) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidRequest(format!("header {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidRequest(format!("header {name}: {e}")))?;
            headers.insert(name, value);
        }
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::InvalidRequest(format!("authorization header: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Perform a request and return the response body as JSON.
    ///
    /// An empty success body resolves to `Value::Null`.
    pub async fn fetch(
        &self,
        endpoint: &str,
        options: RequestOptions,
        query: &QueryParams,
    ) -> ApiResult<Value> {
        let url = self.build_url(endpoint, query)?;
        let token = if options.anonymous {
            None
        } else {
            self.session.resolve_token()
        };
        let headers = Self::build_headers(&options, token.as_deref())?;

        debug!(method = %options.method, %url, authenticated = token.is_some(), "api request");

        let mut req = self
            .http
            .request(options.method.clone(), url.clone())
            .headers(headers);
        if let Some(body) = &options.body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Network(friendly_error(&self.base_url, &e)))?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED && !options.anonymous {
            return Err(self.handle_unauthorized(endpoint));
        }

        let body_text = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(friendly_error(&self.base_url, &e)))?;

        if !status.is_success() {
            let message = error_message_from_body(&body_text);
            warn!(status = status.as_u16(), endpoint, %message, "api request failed");
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        if body_text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body_text).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// A 401 either means the session is really over, or the in-memory
    /// session lagged behind storage. Which one is decided by the persisted
    /// token. The request itself is never retried.
    fn handle_unauthorized(&self, endpoint: &str) -> ApiError {
        match self.session.stored_token() {
            Some(stored) if !token::is_expired(&stored) => {
                // A server-side revoked token also lands here. Re-hydrate
                // once and let the caller decide.
                warn!(
                    endpoint,
                    "401 with an unexpired stored token, re-initializing session"
                );
                self.session.initialize();
                ApiError::Authorization
            }
            _ => {
                info!(endpoint, "401 with no valid stored token, logging out");
                self.session.logout();
                ApiError::SessionExpired
            }
        }
    }

    /// [`fetch`](Self::fetch), then deserialize into `T`.
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
        query: &QueryParams,
    ) -> ApiResult<T> {
        let value = self.fetch(endpoint, options, query).await?;
        serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.fetch_as(endpoint, RequestOptions::get(), &QueryParams::new())
            .await
    }

    pub async fn get_with<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &QueryParams,
    ) -> ApiResult<T> {
        self.fetch_as(endpoint, RequestOptions::get(), query).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.fetch_as(endpoint, RequestOptions::post(to_body(body)?), &QueryParams::new())
            .await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.fetch_as(endpoint, RequestOptions::put(to_body(body)?), &QueryParams::new())
            .await
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.fetch_as(endpoint, RequestOptions::patch(to_body(body)?), &QueryParams::new())
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.fetch_as(endpoint, RequestOptions::delete(), &QueryParams::new())
            .await
    }
}
