//! A small FTP client covering what the relay needs: login, transfer type,
//! directory change, and a single `STOR` over a passive or active data
//! connection.

mod client;
mod reply;
mod url;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::domain::{
    error::TransferError,
    ports::{FileTransfer, ObjectBody, UploadRequest},
};

use client::FtpSession;
pub use url::FtpUrl;

#[derive(Debug, Clone, Copy, Default)]
pub struct FtpUploader;

impl FtpUploader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileTransfer for FtpUploader {
    async fn upload(
        &self,
        request: &UploadRequest<'_>,
        body: &mut ObjectBody,
    ) -> Result<String, TransferError> {
        let url = FtpUrl::parse(&request.url)?;
        let (directory, file_name) = url.directory_and_file();
        // Keys may legally contain CR/LF, which would split a control command.
        if file_name.is_empty() || [directory, file_name].iter().any(|part| has_line_break(part)) {
            return Err(TransferError::InvalidDestination(request.url.clone()));
        }

        info!("Connecting to FTP server {}", url.socket_address());
        let mut session = FtpSession::connect(&url, request.options.keep_alive).await?;
        session.login(request.credentials).await?;
        debug!("Logged in as {}", request.credentials.username);

        session.set_binary(request.options.binary).await?;
        if !directory.is_empty() {
            session.change_dir(directory).await?;
        }

        let store = format!("STOR {}", file_name);
        let mut data = if request.options.passive {
            let stream = session.open_passive().await?;
            session.command(&store, &[125, 150]).await?;
            stream
        } else {
            let listener = session.open_active().await?;
            session.command(&store, &[125, 150]).await?;
            let (stream, peer) = listener.accept().await?;
            debug!("Accepted active data connection from {}", peer);
            stream
        };

        let bytes = tokio::io::copy(body, &mut data).await?;
        data.shutdown().await?;
        drop(data);

        let reply = session.read_reply().await?;
        if !reply.is(&[226, 250]) {
            return Err(TransferError::Rejected {
                command: store,
                reply: reply.to_string(),
            });
        }
        info!("Stored {} ({} bytes), server replied: {}", file_name, bytes, reply);

        session.quit().await;
        Ok(reply.to_string())
    }
}

pub(crate) fn has_line_break(argument: &str) -> bool {
    argument.contains(&['\r', '\n'][..])
}
