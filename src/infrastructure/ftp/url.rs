use crate::domain::error::TransferError;

pub const DEFAULT_PORT: u16 = 21;

/// A parsed `ftp://host[:port][/path]` address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpUrl {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl FtpUrl {
    pub fn parse(url: &str) -> Result<Self, TransferError> {
        let invalid = || TransferError::InvalidDestination(url.to_string());

        let rest = match url.get(..6) {
            Some(scheme) if scheme.eq_ignore_ascii_case("ftp://") => &url[6..],
            _ => return Err(invalid()),
        };

        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };

        let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
            let (host, tail) = bracketed.split_once(']').ok_or_else(invalid)?;
            let port = match tail {
                "" => DEFAULT_PORT,
                _ => tail
                    .strip_prefix(':')
                    .and_then(|p| p.parse().ok())
                    .ok_or_else(invalid)?,
            };
            (host, port)
        } else {
            match authority.rsplit_once(':') {
                Some((host, port)) => (host, port.parse().map_err(|_| invalid())?),
                None => (authority, DEFAULT_PORT),
            }
        };

        if host.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            host: host.to_string(),
            port,
            path: path.to_string(),
        })
    }

    /// Suitable for `tokio::net::lookup_host`.
    pub fn socket_address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Splits the path into the directory to change into and the file name to
    /// store. The directory is empty when the file sits at the login root.
    pub fn directory_and_file(&self) -> (&str, &str) {
        match self.path.rfind('/') {
            Some(0) | None => ("", self.path.trim_start_matches('/')),
            Some(idx) => (&self.path[..idx], &self.path[idx + 1..]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_port_and_path() {
        let url = FtpUrl::parse("ftp://files.example.com:2121/inbound/data.csv").unwrap();
        assert_eq!(url.host, "files.example.com");
        assert_eq!(url.port, 2121);
        assert_eq!(url.path, "/inbound/data.csv");
        assert_eq!(url.directory_and_file(), ("/inbound", "data.csv"));
    }

    #[test]
    fn defaults_port_and_handles_root_files() {
        let url = FtpUrl::parse("FTP://10.0.0.1/data.csv").unwrap();
        assert_eq!(url.port, DEFAULT_PORT);
        assert_eq!(url.socket_address(), "10.0.0.1:21");
        assert_eq!(url.directory_and_file(), ("", "data.csv"));
    }

    #[test]
    fn parses_bracketed_ipv6() {
        let url = FtpUrl::parse("ftp://[::1]:2100/x/y.bin").unwrap();
        assert_eq!(url.host, "::1");
        assert_eq!(url.socket_address(), "[::1]:2100");
    }

    #[test]
    fn keeps_nested_key_prefixes_in_directory() {
        let url = FtpUrl::parse("ftp://host/drop/2024/01/report.csv").unwrap();
        assert_eq!(url.directory_and_file(), ("/drop/2024/01", "report.csv"));
    }

    #[test]
    fn rejects_other_schemes_and_bad_ports() {
        assert!(FtpUrl::parse("sftp://host/x").is_err());
        assert!(FtpUrl::parse("ftp://host:abc/x").is_err());
        assert!(FtpUrl::parse("ftp:///x").is_err());
    }
}
