//! Message transport seam.
//!
//! The aggregator is reached through a publish-with-routing-key operation. The
//! broker client lives behind [`MessagePublisher`]; this crate ships a stdout
//! publisher for the command-line tool and an in-memory one for tests.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;

use fcv_core::ResultEnvelope;

#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        envelope: &ResultEnvelope,
    ) -> Result<()>;
}

/// One message as it leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedMessage {
    pub exchange: String,
    pub routing_key: String,
    pub payload: ResultEnvelope,
}

impl PublishedMessage {
    pub fn new(exchange: &str, routing_key: &str, envelope: &ResultEnvelope) -> Self {
        Self {
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            payload: envelope.clone(),
        }
    }
}

/// Writes each message as one JSON line on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutPublisher;

#[async_trait]
impl MessagePublisher for StdoutPublisher {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        envelope: &ResultEnvelope,
    ) -> Result<()> {
        let message = PublishedMessage::new(exchange, routing_key, envelope);
        let mut line = serde_json::to_vec(&message).context("Failed to serialize message")?;
        line.push(b'\n');

        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(&line)
            .await
            .context("Failed to write message to stdout")?;
        stdout.flush().await.context("Failed to flush stdout")?;
        Ok(())
    }
}

/// Keeps published messages in memory.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    messages: Mutex<Vec<PublishedMessage>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MessagePublisher for RecordingPublisher {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        envelope: &ResultEnvelope,
    ) -> Result<()> {
        let mut messages = self
            .messages
            .lock()
            .map_err(|_| anyhow::anyhow!("Recorded messages lock poisoned"))?;
        messages.push(PublishedMessage::new(exchange, routing_key, envelope));
        Ok(())
    }
}
