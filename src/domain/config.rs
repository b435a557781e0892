use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Resolved relay settings. Built once per execution environment and shared
/// read-only by every invocation it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    destination_address: String,
    credentials: Credentials,
}

impl RelayConfig {
    /// Builds a configuration from values that are already in plain text.
    pub fn new(
        destination_address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            destination_address: destination_address.into(),
            credentials: Credentials {
                username: username.into(),
                password: password.into(),
            },
        }
    }

    pub fn destination_address(&self) -> &str {
        &self.destination_address
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// `{destination_address}/{key}`, without doubling a trailing slash.
    pub fn upload_url(&self, key: &str) -> String {
        format!("{}/{}", self.destination_address.trim_end_matches('/'), key)
    }
}
