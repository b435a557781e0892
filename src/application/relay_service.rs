use std::sync::Arc;
use tracing::{debug, error, info};

use crate::application::event_extractor::extract_file;
use crate::domain::{
    config::RelayConfig,
    error::{RelayError, TransferError},
    models::{FileToRelay, S3Event, TransferOptions},
    ports::{FileTransfer, ObjectSource, RelayLog, UploadRequest},
};

pub struct RelayService {
    config: Arc<RelayConfig>,
    object_source: Arc<dyn ObjectSource>,
    file_transfer: Arc<dyn FileTransfer>,
    options: TransferOptions,
}

impl RelayService {
    pub fn new(
        config: Arc<RelayConfig>,
        object_source: Arc<dyn ObjectSource>,
        file_transfer: Arc<dyn FileTransfer>,
    ) -> Self {
        Self {
            config,
            object_source,
            file_transfer,
            options: TransferOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TransferOptions) -> Self {
        self.options = options;
        self
    }

    /// Handles one notification. `Ok(None)` means the event named no object.
    pub async fn handle(
        &self,
        event: &S3Event,
        log: Option<&dyn RelayLog>,
    ) -> Result<Option<String>, RelayError> {
        let Some(file) = extract_file(event) else {
            info!("Notification carried no object to relay");
            return Ok(None);
        };

        match self.relay_file(&file).await {
            Ok(result) => {
                if let Some(log) = log {
                    log.info(&result);
                }
                Ok(Some(result))
            }
            Err(e) => {
                if let Some(log) = log {
                    log.error(&format!(
                        "Error getting object {} from bucket {}. Make sure they exist and your bucket is in the same region as this function.",
                        e.key, e.bucket
                    ));
                    log.error(&e.source.to_string());
                    log.error(&format!("{:?}", e.source));
                }
                Err(e)
            }
        }
    }

    pub async fn relay_file(&self, file: &FileToRelay) -> Result<String, RelayError> {
        info!("Starting relay: s3://{}/{}", file.bucket, file.key);

        let wrap = |source: TransferError| RelayError {
            bucket: file.bucket.clone(),
            key: file.key.clone(),
            source,
        };

        let request = UploadRequest {
            url: self.config.upload_url(&file.key),
            credentials: self.config.credentials(),
            options: self.options,
        };
        debug!("Upload target: {} ({:?})", request.url, request.options);

        debug!("Opening S3 object stream: {}/{}", file.bucket, file.key);
        let mut body = self
            .object_source
            .open_object(&file.bucket, &file.key)
            .await
            .map_err(|e| {
                error!("Failed to open object {}/{}: {}", file.bucket, file.key, e);
                wrap(e)
            })?;

        debug!("Streaming object to {}", request.url);
        let status = self
            .file_transfer
            .upload(&request, &mut body)
            .await
            .map_err(|e| {
                error!("Failed to upload {} to {}: {}", file.key, request.url, e);
                wrap(e)
            })?;

        let result = format!("Upload File Complete, status {}", status);
        info!("Relayed s3://{}/{} to {}", file.bucket, file.key, request.url);
        Ok(result)
    }
}
