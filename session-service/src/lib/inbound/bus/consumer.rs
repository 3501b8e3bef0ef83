use std::sync::Arc;

use futures::StreamExt;
use rdkafka::consumer::CommitMode;
use rdkafka::consumer::Consumer;
use rdkafka::consumer::StreamConsumer;
use rdkafka::error::KafkaError;
use rdkafka::message::BorrowedMessage;
use rdkafka::message::Headers;
use rdkafka::ClientConfig;
use rdkafka::Message;
use thiserror::Error;

use super::dispatcher::SessionDispatcher;
use super::envelope::AckNack;
use super::envelope::Completion;
use crate::config::Config;
use crate::outbound::bus::headers;
use crate::outbound::bus::BusProducer;
use crate::session::ports::SessionManager;

#[derive(Debug, Error)]
enum RequestProcessingError {
    #[error("Kafka consumer error: {0}")]
    KafkaError(#[from] KafkaError),

    #[error("Request has no payload")]
    NoPayload,

    #[error("Request is missing the '{0}' header")]
    MissingHeader(&'static str),
}

/// Kafka consumer for inbound operation requests.
///
/// Auto-commit is off: an ack commits the message offset, a nack leaves it
/// uncommitted so redelivery follows the broker's policy. Replies go back to
/// the requester's reply topic under the request's correlation id.
pub struct KafkaRequestConsumer<S>
where
    S: SessionManager,
{
    consumer: StreamConsumer,
    producer: Arc<BusProducer>,
    dispatcher: SessionDispatcher<S>,
}

impl<S> KafkaRequestConsumer<S>
where
    S: SessionManager,
{
    /// Create a consumer subscribed to the service's request topic.
    pub fn new(
        config: &Config,
        producer: Arc<BusProducer>,
        dispatcher: SessionDispatcher<S>,
    ) -> Result<Self, anyhow::Error> {
        tracing::info!(
            brokers = %config.kafka.brokers,
            group_id = %config.kafka.group_id,
            topic = %config.kafka.requests_topic,
            "Initializing request consumer"
        );

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.kafka.brokers)
            .set("group.id", &config.kafka.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "30000")
            .set("enable.partition.eof", "false")
            .create()?;

        consumer.subscribe(&[&config.kafka.requests_topic])?;

        Ok(Self {
            consumer,
            producer,
            dispatcher,
        })
    }

    /// Start consuming requests.
    ///
    /// This is a long-running task that should be spawned in a separate
    /// tokio task. Requests are handled one at a time; concurrency across
    /// requests comes from running more consumer instances in the group.
    pub async fn start_consuming(self) {
        tracing::info!("Starting request consumer loop");

        let mut stream = self.consumer.stream();

        while let Some(result) = stream.next().await {
            if let Err(e) = self.process_request(result).await {
                tracing::error!("Error processing request: {}", e);

                // Back off on broker errors to avoid a tight error loop
                if matches!(e, RequestProcessingError::KafkaError(_)) {
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                }
            }
        }

        tracing::warn!("Request consumer loop ended");
    }

    async fn process_request(
        &self,
        result: Result<BorrowedMessage<'_>, KafkaError>,
    ) -> Result<(), RequestProcessingError> {
        let message = result?;
        let payload = message
            .payload()
            .ok_or(RequestProcessingError::NoPayload)?;
        let operation = header_value(&message, headers::OPERATION)
            .ok_or(RequestProcessingError::MissingHeader(headers::OPERATION))?;
        let correlation_id = header_value(&message, headers::CORRELATION_ID);
        let reply_to = header_value(&message, headers::REPLY_TO);

        tracing::debug!(
            operation = %operation,
            correlation_id = ?correlation_id,
            "Received request"
        );

        let (completion, outcome_rx) = Completion::new();
        let reply = self
            .dispatcher
            .dispatch(&operation, payload, completion)
            .await;

        // Reply delivery is best-effort; the request outcome was already
        // decided by the dispatcher and a lost reply surfaces as the
        // requester's own timeout
        if let (Some(reply_to), Some(correlation_id)) = (reply_to, correlation_id) {
            if let Err(e) = self
                .producer
                .send_reply(&reply_to, &correlation_id, &reply)
                .await
            {
                tracing::error!(error = %e, reply_to = %reply_to, "Failed to send reply");
            }
        }

        match outcome_rx.await.unwrap_or(AckNack::Nack) {
            AckNack::Ack => {
                self.consumer.commit_message(&message, CommitMode::Async)?;
            }
            AckNack::Nack => {
                tracing::warn!(
                    offset = message.offset(),
                    "Request nacked; offset left uncommitted for redelivery"
                );
            }
        }

        Ok(())
    }
}

fn header_value(message: &BorrowedMessage<'_>, name: &str) -> Option<String> {
    let headers = message.headers()?;
    headers.iter().find_map(|header| {
        if header.key == name {
            header
                .value
                .and_then(|value| std::str::from_utf8(value).ok())
                .map(|value| value.to_string())
        } else {
            None
        }
    })
}
