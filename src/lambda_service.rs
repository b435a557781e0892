use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::{debug, error, info, info_span, Instrument};

use crate::{
    application::{config_resolver::ConfigResolver, relay_service::RelayService},
    domain::{models::S3Event, ports::RelayLog},
    infrastructure::{
        ftp::FtpUploader, kms_adapter::KmsDecryptor, s3_adapter::S3ObjectSource,
        tracing_log::TracingRelayLog,
    },
};

pub struct LambdaService {
    relay: RelayService,
}

impl LambdaService {
    /// Resolves configuration and builds the AWS clients. Must complete before
    /// `run` accepts events; a configuration error aborts start-up.
    pub async fn initialize() -> Result<Self, Error> {
        debug!("Initializing Lambda service");

        debug!("Loading AWS configuration");
        let mut aws_config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest());

        // LocalStack
        let endpoint_url = std::env::var("AWS_ENDPOINT_URL").ok();
        if let Some(endpoint_url) = &endpoint_url {
            info!("Using custom AWS endpoint: {}", endpoint_url);
            aws_config_builder = aws_config_builder.endpoint_url(endpoint_url);
        }

        let aws_config = aws_config_builder.load().await;
        debug!("AWS region: {:?}", aws_config.region());

        let mut s3_config = aws_sdk_s3::config::Builder::from(&aws_config);
        if endpoint_url.is_some() {
            s3_config = s3_config.force_path_style(true);
        }
        let s3_client = aws_sdk_s3::Client::from_conf(s3_config.build());
        let kms_client = aws_sdk_kms::Client::new(&aws_config);
        debug!("AWS clients initialized");

        let decryptor = KmsDecryptor::new(kms_client);
        let config = ConfigResolver::new(&decryptor)
            .resolve_from_env()
            .await
            .map_err(|e| {
                error!("Failed to resolve relay configuration: {}", e);
                e
            })?;
        info!("Relay configured for {}", config.destination_address());

        Ok(Self::with_relay(RelayService::new(
            Arc::new(config),
            Arc::new(S3ObjectSource::new(s3_client)),
            Arc::new(FtpUploader::new()),
        )))
    }

    pub fn with_relay(relay: RelayService) -> Self {
        Self { relay }
    }

    pub async fn run(&self) -> Result<(), Error> {
        info!("Waiting for S3 notifications");
        lambda_runtime::run(service_fn(|event: LambdaEvent<S3Event>| self.handle_invocation(event)))
            .await
    }

    pub async fn handle_invocation(
        &self,
        event: LambdaEvent<S3Event>,
    ) -> Result<Option<String>, Error> {
        let LambdaEvent { payload, context } = event;
        let span = info_span!("invocation", request_id = %context.request_id);

        span.in_scope(|| debug!("Received {} records", payload.records.len()));

        let log = TracingRelayLog;
        let result = self
            .relay
            .handle(&payload, Some(&log as &dyn RelayLog))
            .instrument(span)
            .await?;
        Ok(result)
    }
}
