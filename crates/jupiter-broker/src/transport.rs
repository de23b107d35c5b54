//! # HTTP Transport
//!
//! Authenticated JSON requests against a base URL, with exponential-backoff
//! retries and a per-attempt timeout.
//!
//! ## Header precedence
//!
//! Later layers overwrite earlier ones, compared case-insensitively:
//!
//! 1. Configured default headers
//! 2. Credential headers (empty values skipped)
//! 3. Per-call headers
//! 4. `Content-Length` (only with a body)
//! 5. `User-Agent` and `Content-Type`, always
//!
//! ## Retry policy
//!
//! Attempts run `0..=retries`. Before attempt `n >= 1` the client sleeps
//! `base * 2^n`. A timed-out attempt fails the whole request immediately;
//! every other failure is retried until attempts run out, then surfaced as
//! `DeliveryFailed` wrapping the last error.

use crate::adapters::{JsonCodec, ReqwestExecutor};
use crate::domain::config::{TransportConfig, SDK_VERSION};
use crate::domain::credentials::Credentials;
use crate::domain::entities::{HttpHeaders, HttpMethod};
use crate::domain::errors::{BrokerError, BrokerResult};
use crate::ports::outbound::{Codec, HttpExecutor, OutboundRequest, RawResponse};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const UNKNOWN_ERROR: &str = "Unknown error";

/// Body fields consulted, in order, for a remote error message.
const MESSAGE_FIELDS: [&str; 4] = ["message", "error", "reason", "cause"];

/// Per-call overrides shared by the verb helpers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: HttpHeaders,
    /// Overrides the configured retry count
    pub retries: Option<u32>,
    /// Overrides the configured per-attempt timeout
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A single logical request, possibly sent several times.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestInit {
    pub method: HttpMethod,
    /// Path segments, joined with `/`
    pub path: Vec<String>,
    pub body: Option<Value>,
    pub headers: HttpHeaders,
    pub retries: Option<u32>,
    pub timeout: Option<Duration>,
}

impl RequestInit {
    pub fn new<I, S>(method: HttpMethod, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            path: path.into_iter().map(Into::into).collect(),
            body: None,
            headers: HttpHeaders::new(),
            retries: None,
            timeout: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.headers = options.headers;
        self.retries = options.retries;
        self.timeout = options.timeout;
        self
    }
}

/// Authenticated JSON client for the broker API.
pub struct HttpClient {
    base_url: Url,
    config: TransportConfig,
    credentials: Arc<Credentials>,
    executor: Arc<dyn HttpExecutor>,
    codec: JsonCodec,
}

impl HttpClient {
    /// Create a client backed by `reqwest`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the base URL is missing or not absolute.
    pub fn new(config: TransportConfig, credentials: Arc<Credentials>) -> BrokerResult<Self> {
        let executor = Arc::new(ReqwestExecutor::new()?);
        Self::with_executor(config, credentials, executor)
    }

    /// Create a client that sends through `executor`.
    pub fn with_executor(
        mut config: TransportConfig,
        credentials: Arc<Credentials>,
        executor: Arc<dyn HttpExecutor>,
    ) -> BrokerResult<Self> {
        config.validate()?;

        let trimmed = config.base_url.trim();
        config.base_url = trimmed.strip_suffix('/').unwrap_or(trimmed).to_string();

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| BrokerError::InvalidArgument(format!("invalid baseUrl: {e}")))?;

        Ok(Self {
            base_url,
            credentials,
            executor,
            codec: JsonCodec::with_debug(config.debug_payloads),
            config,
        })
    }

    /// Base URL without its trailing slash.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub(crate) fn codec(&self) -> JsonCodec {
        self.codec
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<Credentials> {
        &self.credentials
    }

    /// `JupiterSDK/<version> (Rust; <os>; <arch>)`.
    pub fn user_agent() -> String {
        format!(
            "JupiterSDK/{SDK_VERSION} (Rust; {}; {})",
            std::env::consts::OS,
            std::env::consts::ARCH
        )
    }

    /// Resolve path segments against the base URL.
    ///
    /// One leading `/` is stripped from each segment before joining. The
    /// result is an absolute path, so it replaces any path on the base URL.
    pub fn resolve<S: AsRef<str>>(&self, path: &[S]) -> BrokerResult<Url> {
        let joined = path
            .iter()
            .map(|segment| {
                let segment = segment.as_ref();
                segment.strip_prefix('/').unwrap_or(segment)
            })
            .collect::<Vec<_>>()
            .join("/");

        // A leading `//` would be read as a new authority.
        let pathname = format!("/{}", joined.trim_start_matches('/'));

        self.base_url
            .join(&pathname)
            .map_err(|e| BrokerError::InvalidArgument(format!("invalid path `{pathname}`: {e}")))
    }

    /// Send `init` and decode the JSON result into `T`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a bad path or header, before anything is sent
    /// - `Timeout` as soon as one attempt exceeds its budget
    /// - `DeliveryFailed` once every attempt has failed
    pub async fn request<T: DeserializeOwned>(&self, init: RequestInit) -> BrokerResult<T> {
        let url = self.resolve(init.path.as_slice())?;

        let body = match init.body.as_ref().filter(|b| has_content(b)) {
            Some(value) => Some(self.codec.encode(value)?),
            None => None,
        };

        let headers = self.build_headers(&init.headers, body.as_deref())?;
        let request = OutboundRequest {
            method: init.method,
            url: url.to_string(),
            headers,
            body: body.map(String::into_bytes),
        };

        let retries = init.retries.unwrap_or(self.config.retry.retries);
        let timeout = match init.timeout {
            Some(budget) if budget.is_zero() => None,
            Some(budget) => Some(budget),
            None => self.config.default_timeout(),
        };

        let mut last_error = None;

        for attempt in 0..=retries {
            if attempt > 0 {
                let delay = self.config.retry.delay_for(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Backing off before retry");
                tokio::time::sleep(delay).await;
            }

            debug!(attempt, method = %request.method, url = %request.url, "Sending request");

            let outcome = match timeout {
                Some(budget) => {
                    match tokio::time::timeout(budget, self.attempt(request.clone())).await {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            warn!(
                                attempt,
                                method = %request.method,
                                url = %request.url,
                                timeout_ms = budget.as_millis() as u64,
                                "Request timed out"
                            );
                            return Err(BrokerError::Timeout {
                                timeout_ms: budget.as_millis() as u64,
                            });
                        }
                    }
                }
                None => self.attempt(request.clone()).await,
            };

            match outcome {
                Ok(value) => {
                    return serde_json::from_value(value)
                        .map_err(|e| BrokerError::Decode(e.to_string()));
                }
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    warn!(
                        attempt,
                        method = %request.method,
                        url = %request.url,
                        error = %err,
                        "Request attempt failed"
                    );
                    last_error = Some(err);
                }
            }
        }

        let source = last_error.unwrap_or_else(|| BrokerError::Network("no attempt was made".into()));
        Err(BrokerError::DeliveryFailed {
            attempts: retries.saturating_add(1),
            source: Box::new(source),
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &[&str],
        options: RequestOptions,
    ) -> BrokerResult<T> {
        self.request(RequestInit::new(HttpMethod::Get, path.iter().copied()).with_options(options))
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &[&str],
        body: &B,
        options: RequestOptions,
    ) -> BrokerResult<T> {
        self.with_body(HttpMethod::Post, path, body, options).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &[&str],
        body: &B,
        options: RequestOptions,
    ) -> BrokerResult<T> {
        self.with_body(HttpMethod::Put, path, body, options).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &[&str],
        body: &B,
        options: RequestOptions,
    ) -> BrokerResult<T> {
        self.with_body(HttpMethod::Patch, path, body, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &[&str],
        options: RequestOptions,
    ) -> BrokerResult<T> {
        self.request(
            RequestInit::new(HttpMethod::Delete, path.iter().copied()).with_options(options),
        )
        .await
    }

    async fn with_body<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &[&str],
        body: &B,
        options: RequestOptions,
    ) -> BrokerResult<T> {
        let body = serde_json::to_value(body).map_err(|e| BrokerError::Decode(e.to_string()))?;
        self.request(
            RequestInit::new(method, path.iter().copied())
                .with_body(body)
                .with_options(options),
        )
        .await
    }

    /// One exchange: execute, then classify by status.
    async fn attempt(&self, request: OutboundRequest) -> BrokerResult<Value> {
        let response = self.executor.execute(request).await?;
        let output = self.codec.decode(&response.body)?;

        if response.is_success() {
            return Ok(output);
        }

        Err(BrokerError::RemoteError {
            status: response.status,
            message: remote_message(&output),
        })
    }

    fn build_headers(&self, call: &HttpHeaders, body: Option<&str>) -> BrokerResult<HttpHeaders> {
        let mut headers = HttpHeaders::new();

        for (name, value) in &self.config.default_headers {
            set_header(&mut headers, name, value)?;
        }

        for (name, value) in self.credentials.headers() {
            if value.is_empty() {
                continue;
            }
            set_header(&mut headers, &name, &value)?;
        }

        for (name, value) in call {
            set_header(&mut headers, name, value)?;
        }

        if let Some(body) = body {
            set_header(&mut headers, "Content-Length", &body.len().to_string())?;
        }

        set_header(&mut headers, "User-Agent", &Self::user_agent())?;
        set_header(&mut headers, "Content-Type", self.codec.content_type())?;

        Ok(headers)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("retry", &self.config.retry)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Whether a body is worth sending. `null` and `""` are not.
fn has_content(body: &Value) -> bool {
    match body {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Insert a header, replacing any existing one with the same name in any case.
fn set_header(headers: &mut HttpHeaders, name: &str, value: &str) -> BrokerResult<()> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| BrokerError::InvalidArgument(format!("invalid header name `{name}`: {e}")))?;
    HeaderValue::from_str(value)
        .map_err(|e| BrokerError::InvalidArgument(format!("invalid value for header `{name}`: {e}")))?;

    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
    Ok(())
}

/// Human-readable message for an error body.
///
/// The first present field of `message`, `error`, `reason`, `cause` wins;
/// if that is blank, `errors[0].message` is used.
fn remote_message(body: &Value) -> String {
    let candidate = MESSAGE_FIELDS
        .iter()
        .find_map(|field| body.get(field).filter(|v| !v.is_null()))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

    if let Some(message) = candidate.filter(|m| !m.trim().is_empty()) {
        return message;
    }

    body.get("errors")
        .and_then(|errors| errors.get(0))
        .and_then(|first| first.get("message"))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}
