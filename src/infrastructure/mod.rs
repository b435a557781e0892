pub mod ftp;
pub mod kms_adapter;
pub mod s3_adapter;
pub mod tracing_log;
