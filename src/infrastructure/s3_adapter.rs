use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_s3::{
    error::{DisplayErrorContext, SdkError},
    Client,
};
use tracing::{debug, error};

use crate::domain::{
    error::{ServiceError, TransferError},
    ports::{ObjectBody, ObjectSource},
};

pub struct S3ObjectSource {
    client: Client,
}

impl S3ObjectSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectSource for S3ObjectSource {
    async fn open_object(&self, bucket: &str, key: &str) -> Result<ObjectBody, TransferError> {
        debug!("GetObject s3://{}/{}", bucket, key);
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let e = object_fetch_error(e);
                error!("GetObject failed for {}/{}: {}", bucket, key, e);
                e
            })?;

        debug!(
            "Object stream opened, content length: {:?}, content type: {:?}",
            output.content_length(),
            output.content_type()
        );
        Ok(Box::pin(output.body.into_async_read()))
    }
}

pub(crate) fn object_fetch_error<E, R>(e: SdkError<E, R>) -> TransferError
where
    E: std::error::Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&e).to_string();
    TransferError::ObjectFetch(Box::new(ServiceError::new(message, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::operation::get_object::GetObjectError;
    use aws_sdk_s3::types::error::NoSuchKey;
    use aws_smithy_runtime_api::http::{Response, StatusCode};
    use aws_smithy_types::body::SdkBody;

    #[test]
    fn missing_key_message_survives_into_transfer_error() {
        let raw = Response::new(StatusCode::try_from(404).unwrap(), SdkBody::empty());
        let sdk_error = SdkError::service_error(
            GetObjectError::NoSuchKey(
                NoSuchKey::builder()
                    .message("The specified key does not exist.")
                    .build(),
            ),
            raw,
        );

        let err = object_fetch_error(sdk_error);

        assert!(matches!(err, TransferError::ObjectFetch(_)));
        let rendered = err.to_string();
        assert!(rendered.contains("The specified key does not exist."), "{rendered}");
        assert!(rendered.contains("NoSuchKey"), "{rendered}");
    }
}
