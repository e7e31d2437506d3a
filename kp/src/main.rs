use clap::Parser;
use eyre::{Context, Result};
use log::info;

use kafkapost::cli::Cli;
use kafkapost::config::Config;
use kafkapost::publisher::{KafkaPublisher, Publisher};

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    info!("kafkapost starting: topic={}", config.topic);

    let publisher = if cli.dry_run {
        None
    } else {
        let publisher = KafkaPublisher::connect(&config.broker)
            .await
            .context("Failed to connect to broker")?;
        Some(publisher)
    };

    let mut stdout = std::io::stdout();
    kafkapost::run(&config, publisher.as_ref().map(|p| p as &dyn Publisher), &mut stdout).await?;

    Ok(())
}
