//! The identification string exchanged before any binary packet,
//! from RFC 4253 §4.2.

use std::io::Read;

use crate::{Error, Result};

// An identification line may be at most 255 bytes, CR LF included.
const MAX_ID_LINE: usize = 255;

/// An `SSH-2.0-softwareversion [comments]` identification string, without
/// its trailing CR LF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id {
    software: String,
    comments: Option<String>,
}

impl Id {
    /// Build a protocol-2.0 identifier from a software version string and
    /// optional comments.
    pub fn v2(software: impl Into<String>, comments: Option<impl Into<String>>) -> Self {
        Self {
            software: software.into(),
            comments: comments.map(Into::into),
        }
    }

    /// Parse an identification line, CR/LF already stripped.
    ///
    /// Anything not announcing protocol 2.0 is rejected with
    /// [`Error::UnsupportedVersion`].
    pub fn parse(line: &str) -> Result<Self> {
        let rest = line
            .strip_prefix("SSH-2.0-")
            .ok_or(Error::UnsupportedVersion)?;

        let (software, comments) = match rest.split_once(' ') {
            Some((software, comments)) => (software, Some(comments.to_owned())),
            None => (rest, None),
        };
        if software.is_empty() {
            return Err(Error::UnsupportedVersion);
        }

        Ok(Self {
            software: software.to_owned(),
            comments,
        })
    }

    /// Read the peer's identification line from the stream.
    ///
    /// The line is consumed up to its LF; lines longer than the protocol
    /// maximum of 255 bytes are a protocol error.
    pub fn from_reader(reader: &mut impl Read) -> Result<Self> {
        let mut line = Vec::with_capacity(64);

        loop {
            let mut byte = [0u8; 1];
            reader.read_exact(&mut byte)?;

            if byte[0] == b'\n' {
                break;
            }
            if line.len() == MAX_ID_LINE {
                return Err(Error::Malformed);
            }
            line.push(byte[0]);
        }

        if line.last() == Some(&b'\r') {
            line.pop();
        }

        let line = std::str::from_utf8(&line).map_err(|_| Error::UnsupportedVersion)?;
        Self::parse(line)
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SSH-2.0-{}", self.software)?;
        if let Some(comments) = &self.comments {
            write!(f, " {comments}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn it_displays_the_version_line() {
        assert_eq!(
            Id::v2("NanoSSH_0.1", None::<&str>).to_string(),
            "SSH-2.0-NanoSSH_0.1"
        );
        assert_eq!(
            Id::v2("NanoSSH_0.1", Some("embedded")).to_string(),
            "SSH-2.0-NanoSSH_0.1 embedded"
        );
    }

    #[rstest]
    #[case::plain("SSH-2.0-OpenSSH_9.6", true)]
    #[case::comments("SSH-2.0-OpenSSH_9.6 Debian-1", true)]
    #[case::ssh1("SSH-1.99-foo", false)]
    #[case::garbage("HTTP/1.1 400 Bad Request", false)]
    #[case::empty_software("SSH-2.0-", false)]
    fn it_parses_lines(#[case] line: &str, #[case] ok: bool) {
        assert_eq!(Id::parse(line).is_ok(), ok);
    }

    #[test]
    fn it_reads_a_crlf_terminated_line() {
        let mut bytes = b"SSH-2.0-test_1.0\r\nleftover".as_slice();

        let id = Id::from_reader(&mut bytes).expect("parses");
        assert_eq!(id.to_string(), "SSH-2.0-test_1.0");
        assert_eq!(bytes, b"leftover");
    }

    #[test]
    fn it_rejects_an_unterminated_overlong_line() {
        let bytes = vec![b'a'; 300];
        let mut reader = bytes.as_slice();

        assert!(matches!(
            Id::from_reader(&mut reader),
            Err(Error::Malformed)
        ));
    }
}
