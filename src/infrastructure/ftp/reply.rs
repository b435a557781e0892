use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

use crate::domain::error::TransferError;

/// A complete server reply. Multi-line replies keep every line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl FtpReply {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is(&self, expected: &[u16]) -> bool {
        expected.contains(&self.code)
    }
}

impl fmt::Display for FtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.text())
    }
}

/// One line of a reply: its code, whether more lines follow, and the text.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ReplyLine<'a> {
    pub code: u16,
    pub continues: bool,
    pub text: &'a str,
}

pub(crate) fn parse_reply_line(line: &str) -> Result<ReplyLine<'_>, TransferError> {
    let malformed = || TransferError::MalformedReply(line.to_string());

    let digits = line.get(..3).ok_or_else(malformed)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let code = digits.parse().map_err(|_| malformed())?;

    let (continues, text) = match line.as_bytes().get(3) {
        None => (false, ""),
        Some(b' ') => (false, &line[4..]),
        Some(b'-') => (true, &line[4..]),
        Some(_) => return Err(malformed()),
    };

    Ok(ReplyLine {
        code,
        continues,
        text,
    })
}

/// Reads the data address out of `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)`.
pub fn parse_passive_address(text: &str) -> Result<SocketAddrV4, TransferError> {
    let malformed = || TransferError::MalformedReply(format!("227 {}", text));

    let start = text.find('(').ok_or_else(malformed)?;
    let end = text[start..].find(')').ok_or_else(malformed)? + start;

    let fields = text[start + 1..end]
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| malformed())?;

    match fields.as_slice() {
        [h1, h2, h3, h4, p1, p2] => Ok(SocketAddrV4::new(
            Ipv4Addr::new(*h1, *h2, *h3, *h4),
            (u16::from(*p1) << 8) | u16::from(*p2),
        )),
        _ => Err(malformed()),
    }
}

/// `PORT` argument for an active-mode listener.
pub fn format_port_argument(addr: SocketAddrV4) -> String {
    let [h1, h2, h3, h4] = addr.ip().octets();
    let port = addr.port();
    format!("{},{},{},{},{},{}", h1, h2, h3, h4, port >> 8, port & 0xff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_and_continuation_lines() {
        assert_eq!(
            parse_reply_line("226 Transfer complete.").unwrap(),
            ReplyLine { code: 226, continues: false, text: "Transfer complete." }
        );
        assert_eq!(
            parse_reply_line("220-Welcome").unwrap(),
            ReplyLine { code: 220, continues: true, text: "Welcome" }
        );
        assert_eq!(parse_reply_line("200").unwrap().text, "");
    }

    #[test]
    fn rejects_garbage_lines() {
        assert!(parse_reply_line("hello").is_err());
        assert!(parse_reply_line("22").is_err());
        assert!(parse_reply_line("226xTransfer").is_err());
    }

    #[test]
    fn passive_address_round_trips_with_port_argument() {
        let addr = parse_passive_address("Entering Passive Mode (192,168,1,20,19,137).").unwrap();
        assert_eq!(addr, SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 20), 5001));
        assert_eq!(format_port_argument(addr), "192,168,1,20,19,137");
    }

    #[test]
    fn passive_address_requires_six_fields() {
        assert!(parse_passive_address("Entering Passive Mode (1,2,3,4,5)").is_err());
        assert!(parse_passive_address("Entering Passive Mode").is_err());
        assert!(parse_passive_address("(1,2,3,4,5,300)").is_err());
    }

    #[test]
    fn display_includes_code_and_text() {
        let reply = FtpReply { code: 226, lines: vec!["Transfer complete.".to_string()] };
        assert_eq!(reply.to_string(), "226 Transfer complete.");
    }
}
