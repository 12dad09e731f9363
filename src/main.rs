use clap::Parser;
use std::time::Duration;
use streams_bot::utils::{logger, validation::Validate};
use streams_bot::{
    BotConfig, CliArgs, DiscordRestSink, HttpStreamsSource, StreamSyncPipeline, SyncEngine,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("Starting streams-bot");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = match BotConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config from {:?}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    let interval = Duration::from_secs(args.interval.unwrap_or_else(|| config.interval_seconds()));

    let source = HttpStreamsSource::new(config.api_path.clone(), config.api_key.clone());

    let sink = match DiscordRestSink::connect(
        config.discord_api_base(),
        &config.discord_token,
        config.channel,
    )
    .await
    {
        Ok(sink) => sink,
        Err(e) => {
            tracing::error!("Failed to connect to Discord: {}", e);
            std::process::exit(1);
        }
    };

    let pipeline = StreamSyncPipeline::new(source, sink);
    let engine = SyncEngine::new(pipeline);

    if args.once {
        let report = engine.run_once().await?;
        tracing::info!(
            "Single sync done: {} posted, {} edited, {} deleted",
            report.posted,
            report.edited,
            report.deleted
        );
        return Ok(());
    }

    engine.run(interval).await?;
    Ok(())
}
