use slog::{error, info, Logger};
use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use wims_feed::{
    get_config_info, setup_logger, ArtifactPublisher, Cli, FeedPipeline, HttpUploadPublisher,
    LogNotifier, Notifier, PipelineSettings, RunClock, WebhookNotifier, WimsClient, XmlFetcher,
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = get_config_info();
    let logger = setup_logger(&cli);

    info!(logger, "WIMS feed starting...");
    info!(logger, "  WIMS URL: {}", cli.base_url());
    info!(logger, "  Station list: {}", cli.station_path().display());
    info!(logger, "  Output dir: {}", cli.output_dir().display());

    let pipeline = build_pipeline(&cli, &logger).await?;

    match cli.sleep_interval {
        Some(seconds) => run_on_interval(&pipeline, &logger, seconds).await,
        None => {
            pipeline.run(RunClock::now_utc()).await?;
        }
    }
    Ok(())
}

async fn build_pipeline(cli: &Cli, logger: &Logger) -> Result<FeedPipeline, anyhow::Error> {
    let fetcher = XmlFetcher::new(logger.clone(), &cli.user_agent(), cli.request_timeout())?;
    let client = Arc::new(WimsClient::new(logger.clone(), fetcher));

    let notifier: Arc<dyn Notifier> = match cli.webhook_url.clone() {
        Some(url) => Arc::new(WebhookNotifier::new(logger.clone(), url)),
        None => Arc::new(LogNotifier::new(logger.clone())),
    };

    Ok(FeedPipeline::new(
        logger.clone(),
        PipelineSettings::from(cli),
        client,
        build_publisher(cli, logger).await,
        notifier,
    ))
}

async fn build_publisher(cli: &Cli, logger: &Logger) -> Arc<dyn ArtifactPublisher> {
    if let Some(url) = cli.upload_url.clone() {
        info!(logger, "  Publishing to endpoint: {}", url);
        return Arc::new(HttpUploadPublisher::new(logger.clone(), url));
    }

    #[cfg(feature = "s3")]
    {
        info!(logger, "  Publishing to bucket: {}", cli.bucket());
        Arc::new(
            wims_feed::S3Publisher::new(cli.bucket(), cli.s3_endpoint.clone(), logger.clone())
                .await,
        )
    }

    #[cfg(not(feature = "s3"))]
    {
        if cli.bucket.is_some() {
            slog::warn!(
                logger,
                "bucket {} configured but built without the s3 feature",
                cli.bucket()
            );
        }
        Arc::new(wims_feed::LocalPublisher::new(logger.clone()))
    }
}

async fn run_on_interval(pipeline: &FeedPipeline, logger: &Logger, seconds: u64) {
    info!(logger, "Wait time between runs: {} seconds", seconds);

    let mut run_interval = interval(Duration::from_secs(seconds));
    loop {
        tokio::select! {
            _ = run_interval.tick() => {
                match pipeline.run(RunClock::now_utc()).await {
                    Ok(summary) => info!(
                        logger,
                        "Finished run with {} stations, waiting {} seconds for next run",
                        summary.forecast_file.num_stns,
                        seconds
                    ),
                    Err(err) => error!(logger, "Error processing stations: {:#}", err),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!(logger, "Shutting down");
                break;
            }
        }
    }
}
