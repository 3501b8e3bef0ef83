use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::message::Header;
use rdkafka::message::OwnedHeaders;
use rdkafka::producer::FutureProducer;
use rdkafka::producer::FutureRecord;
use rdkafka::util::Timeout;
use serde_json::Value;
use thiserror::Error;

use super::headers;
use crate::config::Config;

#[derive(Debug, Error)]
pub enum BusProducerError {
    #[error("Failed to send message to Kafka: {0}")]
    SendError(String),

    #[error("Failed to serialize message: {0}")]
    SerializationError(String),
}

/// Kafka producer for the request/reply bus.
///
/// Sends operation requests (pattern + correlation + reply-to headers) and
/// correlated replies. One producer instance is shared by the inbound
/// gateway and the directory client.
pub struct BusProducer {
    producer: FutureProducer,
    timeout: Duration,
}

impl BusProducer {
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        tracing::info!(
            brokers = %config.kafka.brokers,
            "Initializing bus producer"
        );

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.kafka.brokers)
            .set("message.timeout.ms", "5000")
            .set("queue.buffering.max.messages", "10000")
            .set("compression.type", "gzip")
            .create()?;

        Ok(Self {
            producer,
            timeout: Duration::from_secs(5),
        })
    }

    /// Publish an operation request and tell the receiver where to reply.
    pub async fn send_request(
        &self,
        topic: &str,
        operation: &str,
        correlation_id: &str,
        reply_to: &str,
        payload: &Value,
    ) -> Result<(), BusProducerError> {
        let headers = OwnedHeaders::new()
            .insert(Header {
                key: headers::OPERATION,
                value: Some(operation),
            })
            .insert(Header {
                key: headers::CORRELATION_ID,
                value: Some(correlation_id),
            })
            .insert(Header {
                key: headers::REPLY_TO,
                value: Some(reply_to),
            });

        tracing::debug!(
            topic = topic,
            operation = operation,
            correlation_id = correlation_id,
            "Publishing request"
        );

        self.send(topic, correlation_id, headers, payload).await
    }

    /// Publish a reply correlated to an earlier request.
    pub async fn send_reply(
        &self,
        topic: &str,
        correlation_id: &str,
        payload: &Value,
    ) -> Result<(), BusProducerError> {
        let headers = OwnedHeaders::new().insert(Header {
            key: headers::CORRELATION_ID,
            value: Some(correlation_id),
        });

        tracing::debug!(
            topic = topic,
            correlation_id = correlation_id,
            "Publishing reply"
        );

        self.send(topic, correlation_id, headers, payload).await
    }

    async fn send(
        &self,
        topic: &str,
        key: &str,
        headers: OwnedHeaders,
        payload: &Value,
    ) -> Result<(), BusProducerError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| BusProducerError::SerializationError(e.to_string()))?;

        let record = FutureRecord::to(topic)
            .key(key)
            .headers(headers)
            .payload(&body);

        self.producer
            .send(record, Timeout::After(self.timeout))
            .await
            .map_err(|(err, _)| {
                tracing::error!("Failed to send message to Kafka: {}", err);
                BusProducerError::SendError(err.to_string())
            })?;

        Ok(())
    }
}
