use std::sync::Arc;

use fcv_core::{AppError, ResultEnvelope};

use crate::envelope::routing_key_for;
use crate::publisher::MessagePublisher;

/// Publishes result envelopes to the submission exchange. No retries.
#[derive(Clone)]
pub struct ResultDispatcher {
    publisher: Arc<dyn MessagePublisher>,
    exchange: String,
}

impl ResultDispatcher {
    pub fn new(publisher: Arc<dyn MessagePublisher>, exchange: impl Into<String>) -> Self {
        Self {
            publisher,
            exchange: exchange.into(),
        }
    }

    /// Publish `envelope` and return the routing key it was sent with.
    pub async fn dispatch(&self, envelope: &ResultEnvelope) -> Result<&'static str, AppError> {
        let routing_key = routing_key_for(envelope);

        self.publisher
            .publish(&self.exchange, routing_key, envelope)
            .await
            .map_err(|source| AppError::Dispatch {
                routing_key: routing_key.to_string(),
                source,
            })?;

        tracing::info!(
            exchange = %self.exchange,
            routing_key = routing_key,
            validation_result_uuid = %envelope.validation_result_uuid,
            results = envelope.single_validation_results.len(),
            "Validation message sent"
        );

        Ok(routing_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{ROUTING_KEY_ERROR, ROUTING_KEY_SUCCESS};
    use crate::publisher::RecordingPublisher;
    use async_trait::async_trait;
    use fcv_core::{ErrorMetadata, SingleValidationResult};

    struct BrokerDown;

    #[async_trait]
    impl MessagePublisher for BrokerDown {
        async fn publish(
            &self,
            _exchange: &str,
            _routing_key: &str,
            _envelope: &ResultEnvelope,
        ) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn dispatch_selects_routing_key() {
        let publisher = Arc::new(RecordingPublisher::new());
        let dispatcher = ResultDispatcher::new(publisher.clone(), "usi-1:submission-exchange");

        let pass = ResultEnvelope::new(vec![SingleValidationResult::pass("f")], 1, "vr-1");
        let fail = ResultEnvelope::new(vec![SingleValidationResult::error("bad", "f")], 1, "vr-2");

        assert_eq!(dispatcher.dispatch(&pass).await.unwrap(), ROUTING_KEY_SUCCESS);
        assert_eq!(dispatcher.dispatch(&fail).await.unwrap(), ROUTING_KEY_ERROR);

        let messages = publisher.messages();
        assert!(messages
            .iter()
            .all(|m| m.exchange == "usi-1:submission-exchange"));
        assert_eq!(messages[1].payload, fail);
    }

    #[tokio::test]
    async fn publish_failure_propagates() {
        let dispatcher = ResultDispatcher::new(Arc::new(BrokerDown), "ex");
        let envelope = ResultEnvelope::new(vec![SingleValidationResult::pass("f")], 1, "vr-1");

        let err = dispatcher.dispatch(&envelope).await.unwrap_err();
        assert_eq!(err.error_code(), "DISPATCH_ERROR");
        assert!(matches!(
            err,
            AppError::Dispatch { ref routing_key, .. } if routing_key == ROUTING_KEY_SUCCESS
        ));
    }
}
