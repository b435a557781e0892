use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_kms::{
    error::{DisplayErrorContext, SdkError},
    primitives::Blob,
    Client,
};
use tracing::{debug, error};

use crate::domain::{
    error::{ConfigError, ServiceError},
    ports::Decryptor,
};

pub struct KmsDecryptor {
    client: Client,
}

impl KmsDecryptor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Decryptor for KmsDecryptor {
    async fn decrypt(&self, ciphertext: Vec<u8>) -> Result<Vec<u8>, ConfigError> {
        debug!("Calling KMS Decrypt");
        let output = self
            .client
            .decrypt()
            .ciphertext_blob(Blob::new(ciphertext))
            .send()
            .await
            .map_err(|e| {
                let e = decrypt_error(e);
                error!("KMS Decrypt failed: {}", e);
                e
            })?;

        if let Some(key_id) = output.key_id() {
            debug!("Decrypted with key {}", key_id);
        }

        output
            .plaintext
            .map(Blob::into_inner)
            .ok_or(ConfigError::MissingPlaintext)
    }
}

pub(crate) fn decrypt_error<E, R>(e: SdkError<E, R>) -> ConfigError
where
    E: std::error::Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&e).to_string();
    ConfigError::Decrypt(Box::new(ServiceError::new(message, e)))
}
