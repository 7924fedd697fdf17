use std::fmt;

use crate::error::Error;

/// Control channel commands used by the downloader (RFC 959)
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    User(&'a str),
    Pass(&'a str),
    /// `TYPE I`, all transfers are binary
    Binary,
    Cwd(&'a str),
    Pasv,
    List(&'a str),
    Size(&'a str),
    Retr(&'a str),
    Quit,
}

impl Command<'_> {
    fn verb(&self) -> &'static str {
        match self {
            Self::User(_) => "USER",
            Self::Pass(_) => "PASS",
            Self::Binary => "TYPE",
            Self::Cwd(_) => "CWD",
            Self::Pasv => "PASV",
            Self::List(_) => "LIST",
            Self::Size(_) => "SIZE",
            Self::Retr(_) => "RETR",
            Self::Quit => "QUIT",
        }
    }

    fn argument(&self) -> Option<&str> {
        match self {
            Self::User(arg)
            | Self::Pass(arg)
            | Self::Cwd(arg)
            | Self::List(arg)
            | Self::Size(arg)
            | Self::Retr(arg) => Some(arg),
            Self::Binary => Some("I"),
            Self::Pasv | Self::Quit => None,
        }
    }

    /// Encodes the command as a CRLF terminated line.
    /// Arguments containing line breaks are rejected since they would smuggle extra commands.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let line = match self.argument() {
            Some(arg) if arg.contains(['\r', '\n']) => {
                return Err(Error::InvalidArgument(format!(
                    "{} argument contains a line break",
                    self.verb()
                )))
            }
            Some(arg) => format!("{} {}\r\n", self.verb(), arg),
            None => format!("{}\r\n", self.verb()),
        };

        Ok(line.into_bytes())
    }
}

impl fmt::Debug for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass(_) => write!(f, "PASS ****"),
            _ => match self.argument() {
                Some(arg) => write!(f, "{} {}", self.verb(), arg),
                None => write!(f, "{}", self.verb()),
            },
        }
    }
}
