use clap::Parser;
use reqwest::Client;
use slog::{debug, o, Drain, Level, Logger};
use std::{env, path::PathBuf, time::Duration};
use wims_feed_core::{
    find_config_file, load_config, ConfigSource, CONFIG_ENV_VAR, CONFIG_FILE_NAME,
    DEFAULT_BASE_URL, DEFAULT_BUCKET, DEFAULT_ERROR_FILE, DEFAULT_FORECAST_DAYS,
    DEFAULT_REPORT_FILE, DEFAULT_REQUEST_DAYS, DEFAULT_STATION_PATH,
};

use crate::FeedError;

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "WIMS Feed - Builds the legacy WFAS forecast file from WIMS weather and NFDRS data"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $WIMS_FEED_CONFIG, ./wims-feed.toml,
    /// $XDG_CONFIG_HOME/wims-feed/wims-feed.toml, /etc/wims-feed/wims-feed.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "WIMS_FEED_LEVEL")]
    pub level: Option<String>,

    /// WIMS xsql endpoint root
    #[arg(short, long, env = "WIMS_FEED_BASE_URL")]
    pub base_url: Option<String>,

    /// JSON station list
    #[arg(short, long, env = "WIMS_FEED_STATION_PATH")]
    pub station_path: Option<String>,

    /// Directory the report and error files are written to before publishing
    #[arg(short, long, env = "WIMS_FEED_OUTPUT_DIR")]
    pub output_dir: Option<String>,

    /// Report file name, also used as the storage key
    #[arg(long, env = "WIMS_FEED_REPORT_FILE")]
    pub report_file: Option<String>,

    /// File listing stations without usable data
    #[arg(long, env = "WIMS_FEED_ERROR_FILE")]
    pub error_file: Option<String>,

    /// S3 bucket receiving the report (requires the `s3` feature)
    #[arg(long, env = "WIMS_FEED_BUCKET")]
    pub bucket: Option<String>,

    /// Custom S3 endpoint, e.g. for minio
    #[arg(long, env = "WIMS_FEED_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// HTTP endpoint receiving the report as a multipart upload
    #[arg(long, env = "WIMS_FEED_UPLOAD_URL")]
    pub upload_url: Option<String>,

    /// Webhook receiving the JSON run summary
    #[arg(long, env = "WIMS_FEED_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Stations fetched at the same time
    #[arg(long, env = "WIMS_FEED_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Per request timeout in seconds
    #[arg(long, env = "WIMS_FEED_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// Days of forecast requested from WIMS
    #[arg(long, env = "WIMS_FEED_REQUEST_DAYS")]
    pub request_days: Option<i64>,

    /// Forecast days in the report, past `request_days` they are sentinel filled
    #[arg(long, env = "WIMS_FEED_FORECAST_DAYS")]
    pub forecast_days: Option<i64>,

    /// HTTP User-Agent header for WIMS requests
    #[arg(short, long, env = "WIMS_FEED_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Re-run every this many seconds instead of exiting after one run
    #[arg(long, env = "WIMS_FEED_SLEEP_INTERVAL")]
    pub sleep_interval: Option<u64>,
}

impl Cli {
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn station_path(&self) -> PathBuf {
        PathBuf::from(
            self.station_path
                .clone()
                .unwrap_or_else(|| DEFAULT_STATION_PATH.to_string()),
        )
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(self.output_dir.clone().unwrap_or_else(|| "./data".to_string()))
    }

    pub fn report_file(&self) -> String {
        self.report_file
            .clone()
            .unwrap_or_else(|| DEFAULT_REPORT_FILE.to_string())
    }

    pub fn error_file(&self) -> String {
        self.error_file
            .clone()
            .unwrap_or_else(|| DEFAULT_ERROR_FILE.to_string())
    }

    pub fn bucket(&self) -> String {
        self.bucket
            .clone()
            .unwrap_or_else(|| DEFAULT_BUCKET.to_string())
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(4).max(1)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.unwrap_or(20))
    }

    pub fn request_days(&self) -> i64 {
        self.request_days.unwrap_or(DEFAULT_REQUEST_DAYS)
    }

    pub fn forecast_days(&self) -> i64 {
        self.forecast_days.unwrap_or(DEFAULT_FORECAST_DAYS)
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("wims-feed/{}", env!("CARGO_PKG_VERSION")))
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file(CONFIG_ENV_VAR, CONFIG_FILE_NAME)
    };

    let file_config: Cli = load_config(&source).unwrap_or_default();
    merge_config(cli_args, file_config)
}

/// CLI args (and env vars, handled by clap) win over the config file.
pub fn merge_config(cli_args: Cli, file_config: Cli) -> Cli {
    Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        base_url: cli_args.base_url.or(file_config.base_url),
        station_path: cli_args.station_path.or(file_config.station_path),
        output_dir: cli_args.output_dir.or(file_config.output_dir),
        report_file: cli_args.report_file.or(file_config.report_file),
        error_file: cli_args.error_file.or(file_config.error_file),
        bucket: cli_args.bucket.or(file_config.bucket),
        s3_endpoint: cli_args.s3_endpoint.or(file_config.s3_endpoint),
        upload_url: cli_args.upload_url.or(file_config.upload_url),
        webhook_url: cli_args.webhook_url.or(file_config.webhook_url),
        concurrency: cli_args.concurrency.or(file_config.concurrency),
        request_timeout: cli_args.request_timeout.or(file_config.request_timeout),
        request_days: cli_args.request_days.or(file_config.request_days),
        forecast_days: cli_args.forecast_days.or(file_config.forecast_days),
        user_agent: cli_args.user_agent.or(file_config.user_agent),
        sleep_interval: cli_args.sleep_interval.or(file_config.sleep_interval),
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "info" => Level::Info,
        "warn" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

pub fn setup_logger(cli: &Cli) -> Logger {
    let log_level = match cli.level.as_ref() {
        Some(level) => parse_level(level),
        None => parse_level(&env::var("RUST_LOG").unwrap_or_default()),
    };

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(log_level).fuse();
    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

/// Plain HTTP GET of xml documents with a shared client.
pub struct XmlFetcher {
    logger: Logger,
    client: Client,
    timeout: Duration,
}

impl XmlFetcher {
    pub fn new(logger: Logger, user_agent: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            logger,
            client,
            timeout,
        })
    }

    pub async fn fetch_xml(&self, url: &str) -> Result<String, FeedError> {
        debug!(self.logger, "requesting: {}", url);
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}
