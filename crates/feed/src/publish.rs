use async_trait::async_trait;
use reqwest::{multipart, Body, Client};
use serde::Serialize;
use slog::{error, info, Logger};
use std::path::Path;
use tokio::fs::File as TokioFile;
use tokio_util::codec::{BytesCodec, FramedRead};

use crate::FeedError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
}

/// Outcome of persisting one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishStatus {
    pub status: Status,
    pub description: String,
}

impl PublishStatus {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            description: description.into(),
        }
    }

    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            status: Status::Failure,
            description: description.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

#[async_trait]
pub trait ArtifactPublisher: Send + Sync {
    /// Persist `local` under `key`. Failures are reported in the status.
    async fn publish(&self, local: &Path, key: &str) -> PublishStatus;
}

/// Leaves the file where the writer put it.
pub struct LocalPublisher {
    logger: Logger,
}

impl LocalPublisher {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl ArtifactPublisher for LocalPublisher {
    async fn publish(&self, local: &Path, key: &str) -> PublishStatus {
        if local.is_file() {
            info!(self.logger, "{} kept at {}", key, local.display());
            PublishStatus::success(format!("{} written to {}", key, local.display()))
        } else {
            error!(self.logger, "{} missing at {}", key, local.display());
            PublishStatus::failure(format!("{} not found at {}", key, local.display()))
        }
    }
}

/// Sends files to an HTTP endpoint as a multipart `file` part.
pub struct HttpUploadPublisher {
    logger: Logger,
    client: Client,
    endpoint_url: String,
}

impl HttpUploadPublisher {
    pub fn new(logger: Logger, endpoint_url: String) -> Self {
        Self {
            logger,
            client: Client::new(),
            endpoint_url,
        }
    }

    async fn send_file_to_endpoint(&self, local: &Path, key: &str) -> Result<(), FeedError> {
        let file = TokioFile::open(local).await?;
        let stream = FramedRead::new(file, BytesCodec::new());
        let file_body = Body::wrap_stream(stream);

        let part = multipart::Part::stream(file_body)
            .file_name(key.to_owned())
            .mime_str("text/plain")?;
        let form = multipart::Form::new().part("file", part);

        info!(self.logger, "sending {} to endpoint: {}", key, self.endpoint_url);
        self.client
            .post(&self.endpoint_url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl ArtifactPublisher for HttpUploadPublisher {
    async fn publish(&self, local: &Path, key: &str) -> PublishStatus {
        match self.send_file_to_endpoint(local, key).await {
            Ok(()) => {
                info!(self.logger, "{} successfully uploaded", key);
                PublishStatus::success(format!("{} uploaded to {}", key, self.endpoint_url))
            }
            Err(err) => {
                error!(self.logger, "failed to upload {}: {}", key, err);
                PublishStatus::failure(format!("upload of {} failed: {}", key, err))
            }
        }
    }
}
