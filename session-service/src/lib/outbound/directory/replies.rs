use futures::StreamExt;
use rdkafka::consumer::Consumer;
use rdkafka::consumer::StreamConsumer;
use rdkafka::error::KafkaError;
use rdkafka::message::BorrowedMessage;
use rdkafka::message::Headers;
use rdkafka::ClientConfig;
use rdkafka::Message;
use thiserror::Error;

use super::client::PendingReplies;
use crate::config::Config;
use crate::outbound::bus::headers;

#[derive(Debug, Error)]
enum ReplyProcessingError {
    #[error("Kafka consumer error: {0}")]
    KafkaError(#[from] KafkaError),

    #[error("Reply has no payload")]
    NoPayload,

    #[error("Reply is missing the '{0}' header")]
    MissingHeader(&'static str),

    #[error("Failed to deserialize reply: {0}")]
    DeserializationError(#[from] serde_json::Error),
}

/// Kafka consumer for directory replies.
///
/// Resolves the pending table entry matching each reply's correlation id.
/// Replies arriving after their request timed out have no entry left and are
/// dropped.
pub struct DirectoryReplyConsumer {
    consumer: StreamConsumer,
    pending: PendingReplies,
}

impl DirectoryReplyConsumer {
    pub fn new(config: &Config, pending: PendingReplies) -> Result<Self, anyhow::Error> {
        let group_id = format!("{}-replies", config.kafka.group_id);

        tracing::info!(
            brokers = %config.kafka.brokers,
            group_id = %group_id,
            topic = %config.kafka.replies_topic,
            "Initializing directory reply consumer"
        );

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.kafka.brokers)
            .set("group.id", &group_id)
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", "5000")
            // Stale replies are useless; only consume what arrives from now on
            .set("auto.offset.reset", "latest")
            .set("session.timeout.ms", "30000")
            .set("enable.partition.eof", "false")
            .create()?;

        consumer.subscribe(&[&config.kafka.replies_topic])?;

        Ok(Self { consumer, pending })
    }

    /// Start consuming replies.
    ///
    /// This is a long-running task that should be spawned in a separate
    /// tokio task.
    pub async fn start_consuming(self) {
        tracing::info!("Starting directory reply consumer loop");

        let mut stream = self.consumer.stream();

        while let Some(result) = stream.next().await {
            if let Err(e) = self.process_reply(result).await {
                tracing::error!("Error processing reply: {}", e);

                if matches!(e, ReplyProcessingError::KafkaError(_)) {
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                }
            }
        }

        tracing::warn!("Directory reply consumer loop ended");
    }

    async fn process_reply(
        &self,
        result: Result<BorrowedMessage<'_>, KafkaError>,
    ) -> Result<(), ReplyProcessingError> {
        let message = result?;
        let payload = message.payload().ok_or(ReplyProcessingError::NoPayload)?;
        let correlation_id = header_value(&message, headers::CORRELATION_ID).ok_or(
            ReplyProcessingError::MissingHeader(headers::CORRELATION_ID),
        )?;

        let reply: serde_json::Value = serde_json::from_slice(payload)?;

        match self.pending.lock().await.remove(&correlation_id) {
            Some(tx) => {
                // Receiver may have timed out between lookup and send
                let _ = tx.send(reply);
            }
            None => {
                tracing::debug!(
                    correlation_id = %correlation_id,
                    "No pending request for reply, dropping"
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
