//! The single publish run

use std::io::Write;

use eyre::{Context, Result};
use log::{debug, info, warn};

use crate::config::Config;
use crate::publisher::{Delivery, Publisher};

/// How the publish step ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered(Delivery),
    Failed(String),
    /// No publisher was given (dry run)
    Skipped,
}

/// Result of one run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The JSON text written to `out` and published
    pub json: String,
    pub outcome: DeliveryOutcome,
}

/// Generate one coordinate message, print it, publish it, then linger
///
/// Delivery failures are logged and reported in [`RunReport::outcome`].
/// Connection failures from the publisher, invalid coordinate settings and
/// write errors on `out` are returned as errors.
pub async fn run<W: Write>(config: &Config, publisher: Option<&dyn Publisher>, out: &mut W) -> Result<RunReport> {
    let mut generator = config.coordinates.generator().context("Invalid coordinate settings")?;
    let message = generator
        .next_message()
        .with_prediction(config.coordinates.prediction.as_deref());
    let json = message.to_json()?;

    writeln!(out, "{}", json).context("Failed to write message")?;
    out.flush().context("Failed to flush output")?;

    let outcome = match publisher {
        Some(publisher) => match publisher.publish(&config.topic, json.as_bytes()).await {
            Ok(delivery) => {
                info!(
                    "Delivered to {} partition {} at offset {}",
                    delivery.topic, delivery.partition, delivery.offset
                );
                DeliveryOutcome::Delivered(delivery)
            }
            Err(e) if e.is_connection_error() => {
                return Err(e).context("Lost connection to broker");
            }
            Err(e) => {
                warn!("Delivery to {} failed: {}", config.topic, e);
                DeliveryOutcome::Failed(e.to_string())
            }
        },
        None => {
            debug!("run: no publisher, skipping publish");
            DeliveryOutcome::Skipped
        }
    };

    if config.linger_ms > 0 {
        info!("Lingering for {:?}", config.linger());
        tokio::time::sleep(config.linger()).await;
    }

    Ok(RunReport { json, outcome })
}
