//! Kafka publisher built on rskafka

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use rand::Rng;
use rand::seq::IndexedRandom;
use rskafka::client::partition::{Compression, UnknownTopicHandling};
use rskafka::client::{Client, ClientBuilder};
use rskafka::record::Record;

use super::{Delivery, PublishError, Publisher};
use crate::config::BrokerConfig;

/// Publishes to a Kafka cluster through a single client connection
pub struct KafkaPublisher {
    client: Client,
    delivery_timeout: Duration,
}

impl KafkaPublisher {
    /// Connect to the bootstrap brokers
    ///
    /// Fails with [`PublishError::ConnectTimeout`] if no broker answers within
    /// the configured connect timeout.
    pub async fn connect(config: &BrokerConfig) -> Result<Self, PublishError> {
        if config.bootstrap_servers.is_empty() {
            return Err(PublishError::NoBrokers);
        }

        let brokers = config.bootstrap_servers.join(",");
        let timeout = config.connect_timeout();
        info!("Connecting to {}", brokers);

        let builder = ClientBuilder::new(config.bootstrap_servers.clone());
        let client = tokio::time::timeout(timeout, builder.build())
            .await
            .map_err(|_| PublishError::ConnectTimeout {
                brokers: brokers.clone(),
                timeout,
            })?
            .map_err(|source| PublishError::Connect {
                brokers: brokers.clone(),
                source,
            })?;

        debug!("KafkaPublisher::connect: connected to {}", brokers);
        Ok(Self {
            client,
            delivery_timeout: config.delivery_timeout(),
        })
    }

    /// Partitions the broker metadata reports for `topic`
    async fn partitions(&self, topic: &str) -> Result<Vec<i32>, PublishError> {
        let topics = self.client.list_topics().await?;
        Ok(topics
            .into_iter()
            .find(|t| t.name == topic)
            .map(|t| t.partitions.into_iter().collect())
            .unwrap_or_default())
    }

    async fn deliver(&self, topic: &str, payload: &[u8]) -> Result<Delivery, PublishError> {
        let partitions = self.partitions(topic).await?;
        let partition = {
            let mut rng = rand::rng();
            choose_partition(&partitions, &mut rng)
        };
        let partition = match partition {
            Some(p) => p,
            None => {
                debug!("KafkaPublisher::deliver: {} not in metadata, using partition 0", topic);
                0
            }
        };
        debug!("KafkaPublisher::deliver: topic={} partition={}", topic, partition);

        let partition_client = self
            .client
            .partition_client(topic.to_string(), partition, UnknownTopicHandling::Retry)
            .await?;

        let record = Record {
            key: None,
            value: Some(payload.to_vec()),
            headers: BTreeMap::new(),
            timestamp: Utc::now(),
        };

        let offsets = partition_client.produce(vec![record], Compression::NoCompression).await?;
        let offset = offsets.first().copied().ok_or_else(|| PublishError::MissingOffset {
            topic: topic.to_string(),
        })?;

        Ok(Delivery {
            topic: topic.to_string(),
            partition,
            offset,
        })
    }
}

#[async_trait]
impl Publisher for KafkaPublisher {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<Delivery, PublishError> {
        let timeout = self.delivery_timeout;
        tokio::time::timeout(timeout, self.deliver(topic, payload))
            .await
            .map_err(|_| PublishError::DeliveryTimeout {
                topic: topic.to_string(),
                timeout,
            })?
    }
}

/// Pick a partition for a keyless record
///
/// Uniform over the known partitions; `None` when the topic has none.
pub fn choose_partition<R: Rng + ?Sized>(partitions: &[i32], rng: &mut R) -> Option<i32> {
    partitions.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_choose_partition_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(choose_partition(&[], &mut rng), None);
    }

    #[test]
    fn test_choose_partition_single() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(choose_partition(&[3], &mut rng), Some(3));
    }

    #[test]
    fn test_choose_partition_spreads_over_all() {
        let partitions = [0, 1, 2, 3];
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let seen: HashSet<i32> = (0..200)
            .filter_map(|_| choose_partition(&partitions, &mut rng))
            .collect();
        assert_eq!(seen, partitions.into_iter().collect());
    }

    #[tokio::test]
    async fn test_connect_without_brokers() {
        let config = BrokerConfig {
            bootstrap_servers: vec![],
            ..Default::default()
        };

        let err = KafkaPublisher::connect(&config).await.err().unwrap();
        assert!(matches!(err, PublishError::NoBrokers));
        assert!(err.is_connection_error());
    }
}
