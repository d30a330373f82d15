//! Kafka publisher for credit domain events.

use crate::model::CreditCreated;
use corebank_commons::event::Event;
use corebank_commons::remote::MissingConfig;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the Kafka bootstrap servers.
const BROKERS_VAR: &str = "KAFKA_BROKERS";

/// Environment variable holding the credit event topic name.
const TOPIC_VAR: &str = "CREDIT_TOPIC";

/// Default broker acknowledgement deadline per send.
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Failure to hand a credit event to the broker.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The producer could not be created.
    #[error("producer setup failed: {0}")]
    Setup(String),
    /// The event could not be serialized.
    #[error("event serialization failed: {0}")]
    Serialize(String),
    /// The broker rejected or never acknowledged the record.
    #[error("delivery to topic {topic} failed: {reason}")]
    Delivery {
        /// Topic the record was bound for
        topic: String,
        /// Broker-side failure description
        reason: String,
    },
}

/// Sink for `CreditCreated` events.
///
/// Publication is strictly after commit and best effort: the workflow logs
/// and counts a failure but never unwinds the stored credit over it.
pub trait CreditEventPublisher: Send + Sync {
    /// Publishes one event.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the event cannot be serialized or the
    /// broker does not acknowledge it in time.
    fn publish(
        &self,
        event: &Event<CreditCreated>,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;
}

/// Kafka-backed [`CreditEventPublisher`].
///
/// Wraps one `FutureProducer` built at startup. The handle is cheap to
/// clone; every clone shares the same producer and its buffers, so a
/// process should build exactly one and pass clones around.
#[derive(Clone)]
pub struct KafkaCreditEventPublisher {
    producer: FutureProducer,
    topic: String,
    send_timeout: Duration,
}

impl KafkaCreditEventPublisher {
    /// Creates a publisher for the given brokers and topic.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Setup`] when the producer cannot be created.
    pub fn new(brokers: &str, topic: impl Into<String>) -> Result<Self, PublishError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .set("acks", "all")
            .create()
            .map_err(|e| PublishError::Setup(e.to_string()))?;

        tracing::info!(brokers, "credit event producer created");

        Ok(Self {
            producer,
            topic: topic.into(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
        })
    }

    /// Creates a publisher from the `KAFKA_BROKERS` and `CREDIT_TOPIC`
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`MissingConfig`] when either variable is not set or the
    /// producer cannot be created.
    pub fn from_env() -> Result<Self, MissingConfig> {
        let brokers = std::env::var(BROKERS_VAR).map_err(|_| MissingConfig(BROKERS_VAR))?;
        let topic = std::env::var(TOPIC_VAR).map_err(|_| MissingConfig(TOPIC_VAR))?;
        Self::new(&brokers, topic).map_err(|_| MissingConfig(BROKERS_VAR))
    }
}

impl CreditEventPublisher for KafkaCreditEventPublisher {
    async fn publish(&self, event: &Event<CreditCreated>) -> Result<(), PublishError> {
        let payload =
            serde_json::to_vec(event).map_err(|e| PublishError::Serialize(e.to_string()))?;

        // Key on the account number so events for one account stay ordered
        // within a partition.
        let record = FutureRecord::to(&self.topic)
            .payload(&payload)
            .key(event.data.account_number.as_bytes());

        match self
            .producer
            .send(record, Timeout::After(self.send_timeout))
            .await
        {
            Ok((partition, offset)) => {
                tracing::debug!(
                    topic = %self.topic,
                    partition,
                    offset,
                    event_id = %event.id,
                    "credit event published"
                );
                Ok(())
            }
            Err((kafka_error, _)) => Err(PublishError::Delivery {
                topic: self.topic.clone(),
                reason: kafka_error.to_string(),
            }),
        }
    }
}
