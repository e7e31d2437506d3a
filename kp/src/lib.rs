//! KafkaPost - seeded coordinate publisher
//!
//! Generates one random coordinate pair from a seeded ChaCha8 generator,
//! prints it as JSON and publishes the same bytes to a Kafka topic.
//!
//! # Example
//!
//! ```ignore
//! use kafkapost::config::Config;
//! use kafkapost::publisher::KafkaPublisher;
//!
//! let config = Config::default();
//! let publisher = KafkaPublisher::connect(&config.broker).await?;
//! let report = kafkapost::run(&config, Some(&publisher), &mut std::io::stdout()).await?;
//! println!("{}", report.json);
//! ```

pub mod cli;
pub mod config;
pub mod coordinates;
pub mod publisher;
mod runner;

pub use coordinates::{CoordinateError, CoordinateGenerator, CoordinateMessage, CoordinateRange};
pub use publisher::{Delivery, PublishError, Publisher};
pub use runner::{DeliveryOutcome, RunReport, run};

/// Default bootstrap broker
pub const DEFAULT_BROKER: &str = "eagle5.di.uoa.gr:9092";

/// Default topic
pub const DEFAULT_TOPIC: &str = "SCP476";

/// Default PRNG seed
pub const DEFAULT_SEED: u64 = 1;

/// Default coordinate lower bound (inclusive)
pub const DEFAULT_MIN: f64 = 0.0;

/// Default coordinate upper bound (exclusive)
pub const DEFAULT_MAX: f64 = 50.0;

/// Default sleep after publishing (20s)
pub const DEFAULT_LINGER_MS: u64 = 20_000;
