//! KafkaPost configuration types and loading

use eyre::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::coordinates::{CoordinateGenerator, CoordinateRange};

/// Main KafkaPost configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Broker connection settings
    pub broker: BrokerConfig,

    /// Topic the message is published to
    pub topic: String,

    /// Coordinate generation settings
    pub coordinates: CoordinatesConfig,

    /// Sleep after publishing in milliseconds
    #[serde(rename = "linger-ms")]
    pub linger_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            broker: BrokerConfig::default(),
            topic: crate::DEFAULT_TOPIC.to_string(),
            coordinates: CoordinatesConfig::default(),
            linger_ms: crate::DEFAULT_LINGER_MS,
        }
    }
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        if self.broker.bootstrap_servers.is_empty() {
            return Err(eyre::eyre!("No bootstrap servers configured"));
        }
        if let Some(addr) = self.broker.bootstrap_servers.iter().find(|s| !is_host_port(s)) {
            return Err(eyre::eyre!("Bootstrap server '{}' is not in host:port form", addr));
        }
        if self.topic.trim().is_empty() {
            return Err(eyre::eyre!("Topic name must not be empty"));
        }
        self.coordinates.range()?;
        Ok(())
    }

    /// Get the linger as a Duration
    pub fn linger(&self) -> Duration {
        Duration::from_millis(self.linger_ms)
    }

    /// Load configuration
    ///
    /// An explicit path must load. Otherwise the first readable file of
    /// [`Config::fallback_paths`] wins, and broken ones are skipped with a warning.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            debug!("Config::load: explicit path {}", path.display());
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for path in Self::fallback_paths().iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return Ok(config),
                Err(e) => warn!("Failed to load config from {}: {:#}", path.display(), e),
            }
        }

        info!("No usable config file found, using defaults");
        Ok(Self::default())
    }

    /// Project-local `.kafkapost.yml`, then `<config_dir>/kafkapost/kafkapost.yml`
    pub fn fallback_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".kafkapost.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("kafkapost").join("kafkapost.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from: {}", path.display());
        debug!(
            "Config::load_from_file: topic={} brokers={:?} seed={:?}",
            config.topic, config.broker.bootstrap_servers, config.coordinates.seed
        );
        Ok(config)
    }
}

fn is_host_port(addr: &str) -> bool {
    match addr.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}

/// Broker connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Bootstrap brokers in host:port form
    #[serde(rename = "bootstrap-servers")]
    pub bootstrap_servers: Vec<String>,

    /// How long to wait for the initial connection
    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,

    /// How long to wait for the broker to acknowledge the message
    #[serde(rename = "delivery-timeout-ms")]
    pub delivery_timeout_ms: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: vec![crate::DEFAULT_BROKER.to_string()],
            connect_timeout_ms: 10_000,
            delivery_timeout_ms: 30_000,
        }
    }
}

impl BrokerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }
}

/// Coordinate generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatesConfig {
    /// PRNG seed; `null` seeds from OS entropy
    pub seed: Option<u64>,

    /// Inclusive lower bound
    pub min: f64,

    /// Exclusive upper bound
    pub max: f64,

    /// Optional label published next to the coordinates
    pub prediction: Option<String>,
}

impl Default for CoordinatesConfig {
    fn default() -> Self {
        Self {
            seed: Some(crate::DEFAULT_SEED),
            min: crate::DEFAULT_MIN,
            max: crate::DEFAULT_MAX,
            prediction: None,
        }
    }
}

impl CoordinatesConfig {
    pub fn range(&self) -> Result<CoordinateRange> {
        Ok(CoordinateRange::new(self.min, self.max)?)
    }

    pub fn generator(&self) -> Result<CoordinateGenerator> {
        let range = self.range()?;
        Ok(match self.seed {
            Some(seed) => CoordinateGenerator::seeded(seed, range),
            None => CoordinateGenerator::from_entropy(range),
        })
    }
}
