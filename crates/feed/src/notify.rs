use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use slog::{error, info, Logger};

use crate::{FeedError, PublishStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastFileSummary {
    #[serde(flatten)]
    pub publish: PublishStatus,
    pub num_stns: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorFileSummary {
    #[serde(flatten)]
    pub publish: PublishStatus,
    pub error_stns: Vec<String>,
}

/// What a run produced, sent out once the artifacts are published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub forecast_file: ForecastFileSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_file: Option<ErrorFileSummary>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, summary: &RunSummary) -> Result<(), FeedError>;
}

/// Writes the summary to the log.
pub struct LogNotifier {
    logger: Logger,
}

impl LogNotifier {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, summary: &RunSummary) -> Result<(), FeedError> {
        let message = serde_json::to_string(summary)?;
        info!(self.logger, "run summary: {}", message);
        Ok(())
    }
}

/// POSTs the summary as JSON.
pub struct WebhookNotifier {
    logger: Logger,
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(logger: Logger, url: String) -> Self {
        Self {
            logger,
            client: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, summary: &RunSummary) -> Result<(), FeedError> {
        let response = self.client.post(&self.url).json(summary).send().await?;
        if let Err(err) = response.error_for_status_ref() {
            error!(self.logger, "webhook rejected run summary: {}", err);
            return Err(err.into());
        }
        info!(self.logger, "run summary sent to {}", self.url);
        Ok(())
    }
}
