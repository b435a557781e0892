use std::pin::Pin;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::domain::{
    config::Credentials,
    error::{ConfigError, TransferError},
    models::TransferOptions,
};

pub type ObjectBody = Pin<Box<dyn AsyncRead + Send>>;

#[async_trait]
pub trait Decryptor: Send + Sync {
    async fn decrypt(&self, ciphertext: Vec<u8>) -> Result<Vec<u8>, ConfigError>;
}

#[async_trait]
pub trait ObjectSource: Send + Sync {
    async fn open_object(&self, bucket: &str, key: &str) -> Result<ObjectBody, TransferError>;
}

#[derive(Debug, Clone)]
pub struct UploadRequest<'a> {
    pub url: String,
    pub credentials: &'a Credentials,
    pub options: TransferOptions,
}

#[async_trait]
pub trait FileTransfer: Send + Sync {
    /// Uploads the whole body and returns the server's status description.
    async fn upload(
        &self,
        request: &UploadRequest<'_>,
        body: &mut ObjectBody,
    ) -> Result<String, TransferError>;
}

/// Invocation-scoped log sink.
pub trait RelayLog: Send + Sync {
    fn info(&self, line: &str);
    fn error(&self, line: &str);
}
