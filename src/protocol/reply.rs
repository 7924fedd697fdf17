use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::{Error, Result};

/// A control channel reply: a three digit code and one or more text lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl Reply {
    /// Text of the reply with the code prefixes stripped
    pub fn message(&self) -> String {
        self.lines.join("\n")
    }

    /// Fails with [`Error::Reply`] unless the code is one of `expected`
    pub fn expect(self, expected: &[u16]) -> Result<Self> {
        if expected.contains(&self.code) {
            Ok(self)
        } else {
            Err(self.into())
        }
    }

    /// Reads one complete reply, following the `ddd-` ... `ddd ` multi-line form.
    pub async fn read<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Self> {
        let first = read_line(reader).await?;
        let (code, separator, text) = split_line(&first)
            .ok_or_else(|| Error::BadReply(format!("malformed reply line {first:?}")))?;

        let mut lines = vec![text.to_owned()];
        if separator != Some('-') {
            return Ok(Self { code, lines });
        }

        loop {
            let line = read_line(reader).await?;
            match split_line(&line) {
                Some((last, separator, text)) if last == code && separator != Some('-') => {
                    lines.push(text.to_owned());
                    return Ok(Self { code, lines });
                }
                _ => lines.push(line),
            }
        }
    }
}

async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<String> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Err(Error::UnexpectedEof);
    }

    let line = String::from_utf8_lossy(&buf);
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

fn split_line(line: &str) -> Option<(u16, Option<char>, &str)> {
    let digits = line.get(..3)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let code = digits.parse().ok()?;
    let mut rest = line[3..].chars();
    match rest.next() {
        None => Some((code, None, "")),
        Some(separator @ (' ' | '-')) => Some((code, Some(separator), rest.as_str())),
        Some(_) => None,
    }
}
