//! `reqwest`-backed [`HttpExecutor`].

use crate::domain::entities::HttpMethod;
use crate::domain::errors::{BrokerError, BrokerResult};
use crate::ports::outbound::{HttpExecutor, OutboundRequest, RawResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};

/// Redirects followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// Executes requests with a shared `reqwest::Client`.
///
/// The client pools connections, decompresses gzip/deflate bodies and
/// follows redirects. It applies no timeout of its own.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: Client,
}

impl ReqwestExecutor {
    /// Create an executor with the default client settings.
    pub fn new() -> BrokerResult<Self> {
        let client = Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(|e| BrokerError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wrap a preconfigured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn header_map(request: &OutboundRequest) -> BrokerResult<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(request.headers.len());

    for (name, value) in &request.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| BrokerError::InvalidArgument(format!("invalid header name `{name}`: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| BrokerError::InvalidArgument(format!("invalid value for header `{name}`: {e}")))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, request: OutboundRequest) -> BrokerResult<RawResponse> {
        let headers = header_map(&request)?;

        let mut builder = self
            .client
            .request(method(request.method), &request.url)
            .headers(headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                BrokerError::Network(format!("cannot connect to {}: {e}", request.url))
            } else {
                BrokerError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| BrokerError::Network(format!("failed to read response body: {e}")))?;

        Ok(RawResponse::new(status, body.to_vec()))
    }
}
