use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{lookup_host, TcpListener, TcpSocket, TcpStream};
use tracing::debug;

use crate::domain::{config::Credentials, error::TransferError};
use crate::infrastructure::ftp::reply::{
    format_port_argument, parse_passive_address, parse_reply_line, FtpReply,
};
use crate::infrastructure::ftp::url::FtpUrl;
use crate::infrastructure::ftp::has_line_break;

/// An authenticated-or-not FTP control connection.
pub struct FtpSession {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    peer: SocketAddr,
    local: SocketAddr,
}

impl FtpSession {
    /// Opens the control connection and consumes the server greeting.
    pub async fn connect(url: &FtpUrl, keep_alive: bool) -> Result<Self, TransferError> {
        let address = url.socket_address();
        let connect_error = |source: io::Error| TransferError::Connect {
            address: address.clone(),
            source,
        };

        let mut last_error = None;
        let mut stream = None;
        for addr in lookup_host(&address).await.map_err(connect_error)? {
            match open_socket(addr, keep_alive).await {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => {
                    debug!("Connection to {} failed: {}", addr, e);
                    last_error = Some(e);
                }
            }
        }
        let stream = stream.ok_or_else(|| {
            connect_error(last_error.unwrap_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses")
            }))
        })?;

        let peer = stream.peer_addr()?;
        let local = stream.local_addr()?;
        let (read_half, write_half) = stream.into_split();
        let mut session = Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            peer,
            local,
        };

        let mut greeting = session.read_reply().await?;
        while greeting.code == 120 {
            debug!("FTP < {}", greeting);
            greeting = session.read_reply().await?;
        }
        debug!("FTP < {}", greeting);
        if greeting.code != 220 {
            return Err(TransferError::Rejected {
                command: "connect".to_string(),
                reply: greeting.to_string(),
            });
        }

        Ok(session)
    }

    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), TransferError> {
        let reply = self
            .command(&format!("USER {}", credentials.username), &[230, 331])
            .await?;
        if reply.code == 331 {
            self.command(&format!("PASS {}", credentials.password), &[230, 202])
                .await?;
        }
        Ok(())
    }

    pub async fn set_binary(&mut self, binary: bool) -> Result<(), TransferError> {
        let command = if binary { "TYPE I" } else { "TYPE A" };
        self.command(command, &[200]).await.map(|_| ())
    }

    pub async fn change_dir(&mut self, directory: &str) -> Result<(), TransferError> {
        self.command(&format!("CWD {}", directory), &[200, 250])
            .await
            .map(|_| ())
    }

    /// `PASV`, then connects to the advertised data port.
    pub async fn open_passive(&mut self) -> Result<TcpStream, TransferError> {
        let reply = self.command("PASV", &[227]).await?;
        let advertised = parse_passive_address(&reply.text())?;

        // Servers behind NAT sometimes advertise 0.0.0.0.
        let target = if advertised.ip().is_unspecified() {
            SocketAddr::new(self.peer.ip(), advertised.port())
        } else {
            SocketAddr::V4(advertised)
        };

        debug!("Opening passive data connection to {}", target);
        TcpStream::connect(target)
            .await
            .map_err(|source| TransferError::Connect {
                address: target.to_string(),
                source,
            })
    }

    /// Binds a local data listener and announces it with `PORT` or `EPRT`.
    pub async fn open_active(&mut self) -> Result<TcpListener, TransferError> {
        let listener = TcpListener::bind(SocketAddr::new(self.local.ip(), 0)).await?;
        let command = match listener.local_addr()? {
            SocketAddr::V4(addr) => format!("PORT {}", format_port_argument(addr)),
            SocketAddr::V6(addr) => format!("EPRT |2|{}|{}|", addr.ip(), addr.port()),
        };
        self.command(&command, &[200]).await?;
        Ok(listener)
    }

    pub async fn command(
        &mut self,
        command: &str,
        expected: &[u16],
    ) -> Result<FtpReply, TransferError> {
        self.send(command).await?;
        let reply = self.read_reply().await?;
        debug!("FTP < {}", reply);

        if reply.is(expected) {
            Ok(reply)
        } else {
            Err(TransferError::Rejected {
                command: redact(command),
                reply: reply.to_string(),
            })
        }
    }

    pub async fn read_reply(&mut self) -> Result<FtpReply, TransferError> {
        let first = self.read_line().await?;
        let head = parse_reply_line(&first)?;
        let code = head.code;
        let mut lines = vec![head.text.to_string()];

        if head.continues {
            loop {
                let line = self.read_line().await?;
                match parse_reply_line(&line) {
                    Ok(tail) if tail.code == code && !tail.continues => {
                        lines.push(tail.text.to_string());
                        break;
                    }
                    Ok(tail) if tail.code == code => lines.push(tail.text.to_string()),
                    _ => lines.push(line.trim_start().to_string()),
                }
            }
        }

        Ok(FtpReply { code, lines })
    }

    /// Sends `QUIT`. Failures are only logged since the upload already succeeded.
    pub async fn quit(mut self) {
        if let Err(e) = self.command("QUIT", &[221]).await {
            debug!("QUIT failed: {}", e);
        }
    }

    async fn send(&mut self, command: &str) -> Result<(), TransferError> {
        if has_line_break(command) {
            return Err(TransferError::InvalidDestination(redact(command)));
        }
        debug!("FTP > {}", redact(command));
        self.writer
            .write_all(format!("{}\r\n", command).as_bytes())
            .await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, TransferError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err(TransferError::ConnectionClosed);
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }
}

async fn open_socket(addr: SocketAddr, keep_alive: bool) -> io::Result<TcpStream> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_keepalive(keep_alive)?;
    socket.connect(addr).await
}

fn redact(command: &str) -> String {
    if command.starts_with("PASS ") {
        "PASS ****".to_string()
    } else {
        command.to_string()
    }
}
