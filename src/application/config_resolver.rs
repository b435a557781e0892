use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, error, info};

use crate::domain::{config::RelayConfig, error::ConfigError, ports::Decryptor};
use crate::infrastructure::ftp::FtpUrl;

pub const HOST_VAR: &str = "ip";
pub const REMOTE_DIRECTORY_VAR: &str = "remoteDirectory";
pub const USER_VAR: &str = "user";
pub const PASSWORD_VAR: &str = "password";

/// Resolves the relay configuration, decrypting the password on the way.
pub struct ConfigResolver<'a> {
    decryptor: &'a dyn Decryptor,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(decryptor: &'a dyn Decryptor) -> Self {
        Self { decryptor }
    }

    pub async fn resolve_from_env(&self) -> Result<RelayConfig, ConfigError> {
        self.resolve_with(|name| std::env::var(name).ok()).await
    }

    pub async fn resolve_with<F>(&self, lookup: F) -> Result<RelayConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name).ok_or_else(|| {
                error!("Required environment variable {} is not set", name);
                ConfigError::MissingVariable(name.to_string())
            })
        };

        let host = require(HOST_VAR)?;
        let remote_directory = require(REMOTE_DIRECTORY_VAR)?;
        let username = require(USER_VAR)?;
        let encrypted_password = require(PASSWORD_VAR)?;

        let destination_address = format!("ftp://{}{}", host, remote_directory);
        FtpUrl::parse(&destination_address).map_err(|e| {
            error!("Destination address {} is not usable: {}", destination_address, e);
            ConfigError::InvalidDestination(e)
        })?;
        info!("FTP destination: {}, user: {}", destination_address, username);

        let password = self.decrypt_variable(PASSWORD_VAR, &encrypted_password).await?;

        debug!("Relay configuration resolved");
        Ok(RelayConfig::new(destination_address, username, password))
    }

    async fn decrypt_variable(&self, name: &str, encoded: &str) -> Result<String, ConfigError> {
        let ciphertext = STANDARD.decode(encoded.trim()).map_err(|e| {
            error!("Environment variable {} is not valid base64: {}", name, e);
            ConfigError::InvalidBase64 {
                variable: name.to_string(),
                source: e,
            }
        })?;

        debug!("Decrypting {} ({} bytes of ciphertext)", name, ciphertext.len());
        let plaintext = self.decryptor.decrypt(ciphertext).await.map_err(|e| {
            error!("Failed to decrypt {}: {}", name, e);
            e
        })?;

        Ok(String::from_utf8(plaintext)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ReversingDecryptor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Decryptor for ReversingDecryptor {
        async fn decrypt(&self, mut ciphertext: Vec<u8>) -> Result<Vec<u8>, ConfigError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ciphertext.reverse();
            Ok(ciphertext)
        }
    }

    struct FailingDecryptor;

    #[async_trait]
    impl Decryptor for FailingDecryptor {
        async fn decrypt(&self, _ciphertext: Vec<u8>) -> Result<Vec<u8>, ConfigError> {
            Err(ConfigError::Decrypt("AccessDeniedException".into()))
        }
    }

    fn environment(password_blob: &str) -> HashMap<String, String> {
        HashMap::from([
            (HOST_VAR.to_string(), "10.1.2.3".to_string()),
            (REMOTE_DIRECTORY_VAR.to_string(), "/drop".to_string()),
            (USER_VAR.to_string(), "relay".to_string()),
            (PASSWORD_VAR.to_string(), password_blob.to_string()),
        ])
    }

    #[tokio::test]
    async fn resolves_and_decrypts_password_once() {
        let decryptor = ReversingDecryptor { calls: AtomicUsize::new(0) };
        let env = environment(&STANDARD.encode("terces"));

        let config = ConfigResolver::new(&decryptor)
            .resolve_with(|name| env.get(name).cloned())
            .await
            .unwrap();

        assert_eq!(config.destination_address(), "ftp://10.1.2.3/drop");
        assert_eq!(config.credentials().username, "relay");
        assert_eq!(config.credentials().password, "secret");
        assert_eq!(decryptor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_variable_is_reported_by_name() {
        let decryptor = ReversingDecryptor { calls: AtomicUsize::new(0) };
        let mut env = environment(&STANDARD.encode("x"));
        env.remove(USER_VAR);

        let err = ConfigResolver::new(&decryptor)
            .resolve_with(|name| env.get(name).cloned())
            .await
            .unwrap_err();

        assert!(matches!(err, ConfigError::MissingVariable(ref name) if name == USER_VAR));
        assert_eq!(decryptor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_base64_never_reaches_decryptor() {
        let decryptor = ReversingDecryptor { calls: AtomicUsize::new(0) };
        let env = environment("not base64!!");

        let err = ConfigResolver::new(&decryptor)
            .resolve_with(|name| env.get(name).cloned())
            .await
            .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidBase64 { .. }));
        assert_eq!(decryptor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn decryption_failure_is_propagated() {
        let env = environment(&STANDARD.encode("blob"));

        let err = ConfigResolver::new(&FailingDecryptor)
            .resolve_with(|name| env.get(name).cloned())
            .await
            .unwrap_err();

        assert!(matches!(err, ConfigError::Decrypt(_)));
        assert!(err.to_string().contains("AccessDeniedException"));
    }

    #[tokio::test]
    async fn non_utf8_plaintext_is_rejected() {
        let decryptor = ReversingDecryptor { calls: AtomicUsize::new(0) };
        let env = environment(&STANDARD.encode([0xff, 0xfe]));

        let err = ConfigResolver::new(&decryptor)
            .resolve_with(|name| env.get(name).cloned())
            .await
            .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidUtf8(_)));
    }

    #[tokio::test]
    async fn unparseable_destination_fails_before_decryption() {
        let decryptor = ReversingDecryptor { calls: AtomicUsize::new(0) };
        let mut env = environment(&STANDARD.encode("x"));
        env.insert(HOST_VAR.to_string(), "host:notaport".to_string());

        let err = ConfigResolver::new(&decryptor)
            .resolve_with(|name| env.get(name).cloned())
            .await
            .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidDestination(_)));
        assert_eq!(decryptor.calls.load(Ordering::SeqCst), 0);
    }
}
