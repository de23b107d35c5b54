//! # API Gateway
//!
//! Entry point of the SDK: [`api`] builds a [`Jupiter`] gateway from raw
//! credentials, and [`MessageBroker`] exposes the broker services on top of
//! a shared client.

use crate::domain::config::{api_host, TransportConfig};
use crate::domain::credentials::Credentials;
use crate::domain::errors::{BrokerError, BrokerResult};
use crate::ports::outbound::HttpExecutor;
use crate::producer::Producer;
use crate::transport::HttpClient;
use std::sync::{Arc, OnceLock};

/// Anything that can hand out the credentials it was built with.
pub trait ApiGateway: Send + Sync {
    fn credentials(&self) -> &Arc<Credentials>;
}

/// The Jupiter API gateway.
#[derive(Debug, Clone)]
pub struct Jupiter {
    credentials: Arc<Credentials>,
}

impl Jupiter {
    pub fn new(credentials: Arc<Credentials>) -> Self {
        Self { credentials }
    }

    /// Message broker bound to this gateway's credentials.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the credentials carry no secret.
    pub fn message_broker(&self) -> BrokerResult<MessageBroker> {
        MessageBroker::new(self.credentials.clone())
    }
}

impl ApiGateway for Jupiter {
    fn credentials(&self) -> &Arc<Credentials> {
        &self.credentials
    }
}

/// Create a gateway from an API key, a bearer token and an optional
/// base64 service secret.
///
/// # Errors
///
/// Anything [`Credentials::new`] rejects.
pub fn api(api_key: &str, token: &str, secret: Option<&str>) -> BrokerResult<Jupiter> {
    let credentials = Credentials::new(api_key, token, secret)?;
    Ok(Jupiter::new(Arc::new(credentials)))
}

/// Broker services over one shared [`HttpClient`].
pub struct MessageBroker {
    client: Arc<HttpClient>,
    producer: OnceLock<Arc<Producer>>,
}

impl MessageBroker {
    /// Broker targeting the public API host.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `credentials` has no secret.
    pub fn new(credentials: Arc<Credentials>) -> BrokerResult<Self> {
        Self::with_base_url(credentials, api_host())
    }

    /// Broker targeting `base_url`, e.g. a staging host.
    pub fn with_base_url(credentials: Arc<Credentials>, base_url: &str) -> BrokerResult<Self> {
        Self::check_secret(&credentials)?;
        let client = HttpClient::new(Self::config(base_url), credentials)?;
        Ok(Self::from_client(Arc::new(client)))
    }

    /// Broker sending through a custom executor.
    pub fn with_executor(
        credentials: Arc<Credentials>,
        base_url: &str,
        executor: Arc<dyn HttpExecutor>,
    ) -> BrokerResult<Self> {
        Self::check_secret(&credentials)?;
        let client = HttpClient::with_executor(Self::config(base_url), credentials, executor)?;
        Ok(Self::from_client(Arc::new(client)))
    }

    fn from_client(client: Arc<HttpClient>) -> Self {
        Self {
            client,
            producer: OnceLock::new(),
        }
    }

    fn check_secret(credentials: &Credentials) -> BrokerResult<()> {
        if credentials.has_secret() {
            return Ok(());
        }

        Err(BrokerError::InvalidArgument(
            "credentials must contain the secret key of the queue you want to connect to".into(),
        ))
    }

    fn config(base_url: &str) -> TransportConfig {
        TransportConfig::new(base_url).with_default_header("Accept-Language", "en-US")
    }

    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// The producer, created on first use and shared afterwards.
    pub fn producer(&self) -> Arc<Producer> {
        self.producer
            .get_or_init(|| Arc::new(Producer::from_client(self.client.clone())))
            .clone()
    }
}

impl std::fmt::Debug for MessageBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBroker")
            .field("client", &self.client)
            .field("producer_ready", &self.producer.get().is_some())
            .finish()
    }
}
