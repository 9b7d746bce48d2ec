use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client};
use slog::{error, info, Logger};
use std::path::Path;

use crate::{ArtifactPublisher, PublishStatus};

pub struct S3Publisher {
    client: Client,
    bucket: String,
    logger: Logger,
}

impl S3Publisher {
    pub async fn new(bucket: String, endpoint: Option<String>, logger: Logger) -> Self {
        let mut config_loader = aws_config::from_env();

        if let Some(endpoint_url) = endpoint {
            info!(logger, "Using custom S3 endpoint: {}", endpoint_url);
            config_loader = config_loader.endpoint_url(endpoint_url);
        }

        let config = config_loader.load().await;
        let client = Client::new(&config);

        info!(logger, "S3 storage initialized for bucket: {}", bucket);

        Self {
            client,
            bucket,
            logger,
        }
    }

    pub async fn upload_file(&self, local_path: &Path, s3_key: &str) -> Result<(), anyhow::Error> {
        let body = ByteStream::from_path(local_path).await?;

        info!(
            self.logger,
            "Uploading {} to s3://{}/{}",
            local_path.display(),
            self.bucket,
            s3_key
        );

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(s3_key)
            .body(body)
            .content_type("text/plain")
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {}", e))?;
        Ok(())
    }
}

#[async_trait]
impl ArtifactPublisher for S3Publisher {
    async fn publish(&self, local: &Path, key: &str) -> PublishStatus {
        match self.upload_file(local, key).await {
            Ok(()) => {
                info!(
                    self.logger,
                    "Successfully uploaded to s3://{}/{}", self.bucket, key
                );
                PublishStatus::success(format!("s3://{}/{}", self.bucket, key))
            }
            Err(err) => {
                error!(self.logger, "Failed to upload {} to S3: {}", key, err);
                PublishStatus::failure(err.to_string())
            }
        }
    }
}
