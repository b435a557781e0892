use s3_ftp_relay::lambda_service::LambdaService;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // CloudWatch does not render colours
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("s3_ftp_relay=debug".parse()?)
            .add_directive("aws_sdk=warn".parse()?))
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("Starting S3 to FTP relay");

    let service = LambdaService::initialize().await?;
    info!("Lambda service initialized successfully");

    service.run().await
}
