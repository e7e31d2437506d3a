//! CLI argument parsing for kafkapost

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "kp")]
#[command(author, version, about = "Publish a seeded random coordinate pair to a Kafka topic", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Bootstrap broker in host:port form (repeatable, replaces configured brokers)
    #[arg(short, long = "broker")]
    pub brokers: Vec<String>,

    /// Topic to publish to
    #[arg(short, long)]
    pub topic: Option<String>,

    /// PRNG seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Prediction label to publish next to the coordinates
    #[arg(short, long)]
    pub prediction: Option<String>,

    /// Milliseconds to sleep after publishing (default: 20000)
    #[arg(long)]
    pub linger_ms: Option<u64>,

    /// Print the message without connecting or publishing
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded config
    pub fn apply(&self, config: &mut Config) {
        if !self.brokers.is_empty() {
            config.broker.bootstrap_servers = self.brokers.clone();
        }
        if let Some(topic) = &self.topic {
            config.topic = topic.clone();
        }
        if let Some(seed) = self.seed {
            config.coordinates.seed = Some(seed);
        }
        if let Some(prediction) = &self.prediction {
            config.coordinates.prediction = Some(prediction.clone());
        }
        if let Some(linger_ms) = self.linger_ms {
            config.linger_ms = linger_ms;
        }
    }
}
