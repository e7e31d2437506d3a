//! Message publishing
//!
//! [`Publisher`] is the seam between the run sequence and the broker client.
//! [`KafkaPublisher`] is the production implementation.

use async_trait::async_trait;

mod error;
mod kafka;

pub use error::PublishError;
pub use kafka::{KafkaPublisher, choose_partition};

/// What the broker acknowledged for one published message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// Sends a single keyless, headerless message to a topic
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `payload` and wait for the broker acknowledgement
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<Delivery, PublishError>;
}
