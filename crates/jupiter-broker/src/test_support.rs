//! Scripted doubles for the outbound ports.

use crate::domain::entities::{ProduceResponse, PublishOptions};
use crate::domain::errors::{BrokerError, BrokerResult};
use crate::ports::outbound::{HttpExecutor, MessageDelivery, OutboundRequest, RawResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// Replays scripted outcomes and records what was sent, and when.
#[derive(Default)]
pub(crate) struct ScriptedExecutor {
    script: Mutex<VecDeque<BrokerResult<RawResponse>>>,
    seen: Mutex<Vec<(Instant, OutboundRequest)>>,
    hang: bool,
    hang_when_exhausted: bool,
}

impl ScriptedExecutor {
    pub(crate) fn new(script: Vec<BrokerResult<RawResponse>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        })
    }

    /// An executor whose exchanges never complete.
    pub(crate) fn hanging() -> Arc<Self> {
        Arc::new(Self {
            hang: true,
            ..Self::default()
        })
    }

    /// Replays `script`, then never completes.
    pub(crate) fn hanging_after(script: Vec<BrokerResult<RawResponse>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            hang_when_exhausted: true,
            ..Self::default()
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub(crate) fn request(&self, n: usize) -> OutboundRequest {
        self.seen.lock().unwrap()[n].1.clone()
    }

    pub(crate) fn times(&self) -> Vec<Instant> {
        self.seen.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

#[async_trait]
impl HttpExecutor for ScriptedExecutor {
    async fn execute(&self, request: OutboundRequest) -> BrokerResult<RawResponse> {
        self.seen.lock().unwrap().push((Instant::now(), request));
        if self.hang {
            std::future::pending::<()>().await;
        }
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(outcome) => outcome,
            None if self.hang_when_exhausted => std::future::pending().await,
            None => Err(BrokerError::Network("script exhausted".into())),
        }
    }
}

/// Records every delivered message and acknowledges with a fixed timestamp.
#[derive(Default)]
pub(crate) struct RecordingDelivery {
    pub(crate) delivered: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl MessageDelivery for RecordingDelivery {
    async fn deliver(
        &self,
        topic: &str,
        encoded: &str,
        _options: &PublishOptions,
    ) -> BrokerResult<ProduceResponse> {
        self.delivered
            .lock()
            .unwrap()
            .push((topic.to_string(), encoded.to_string()));
        Ok(ProduceResponse { timestamp: 7 })
    }
}
