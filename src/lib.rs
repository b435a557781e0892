//! Relays objects from S3 to an FTP server when S3 reports a new upload.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod lambda_service;
