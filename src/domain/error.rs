use std::io;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An AWS call failure whose message already includes the nested cause, since
/// the SDK's own `Display` stops at "service error".
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceError {
    message: String,
    #[source]
    source: BoxError,
}

impl ServiceError {
    pub fn new(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: source.into(),
        }
    }
}

/// Start-up failures. Any of these keeps the environment from serving events.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVariable(String),
    #[error("environment variable {variable} is not valid base64: {source}")]
    InvalidBase64 {
        variable: String,
        #[source]
        source: base64::DecodeError,
    },
    #[error("decryption failed: {0}")]
    Decrypt(#[source] BoxError),
    #[error("decryption returned no plaintext")]
    MissingPlaintext,
    #[error("decrypted value is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("invalid destination address: {0}")]
    InvalidDestination(#[source] TransferError),
}

/// Failures while fetching the object or talking to the FTP server.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to fetch object: {0}")]
    ObjectFetch(#[source] BoxError),
    #[error("invalid ftp url '{0}'")]
    InvalidDestination(String),
    #[error("could not connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },
    #[error("ftp server rejected {command}: {reply}")]
    Rejected { command: String, reply: String },
    #[error("malformed ftp reply: {0}")]
    MalformedReply(String),
    #[error("ftp control connection closed unexpectedly")]
    ConnectionClosed,
    #[error("i/o error during transfer: {0}")]
    Io(#[from] io::Error),
}

/// A failed relay of one object, with enough context to log it at the call site.
#[derive(Debug, Error)]
#[error("failed to relay object {key} from bucket {bucket}: {source}")]
pub struct RelayError {
    pub bucket: String,
    pub key: String,
    #[source]
    pub source: TransferError,
}
