//! Publish error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while connecting or publishing
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("No bootstrap servers configured")]
    NoBrokers,

    #[error("Timed out connecting to {brokers} after {timeout:?}")]
    ConnectTimeout { brokers: String, timeout: Duration },

    #[error("Failed to connect to {brokers}: {source}")]
    Connect {
        brokers: String,
        #[source]
        source: rskafka::client::error::Error,
    },

    #[error("Timed out waiting for delivery to {topic} after {timeout:?}")]
    DeliveryTimeout { topic: String, timeout: Duration },

    #[error("Kafka client error: {0}")]
    Kafka(#[from] rskafka::client::error::Error),

    #[error("Broker returned no offset for {topic}")]
    MissingOffset { topic: String },
}

impl PublishError {
    /// Check if this error happened while establishing the connection
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            PublishError::NoBrokers | PublishError::ConnectTimeout { .. } | PublishError::Connect { .. }
        )
    }
}
