use std::{io, path::PathBuf};
use thiserror::Error;

use crate::protocol::Reply;

pub type Result<T> = std::result::Result<T, Error>;

/// Enum for downloader errors
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// `next` was called on a downloader that has no file listing yet
    #[error("A dry run is required before downloading can begin")]
    DryRunRequired,
    /// The local destination of a transfer is already present
    #[error("{} already exists", .0.display())]
    DestinationExists(PathBuf),
    /// A listing entry would resolve outside the target directory
    #[error("Unsafe remote path: {0}")]
    UnsafePath(String),
    /// The server answered with a code the current exchange does not allow
    #[error("{code}: {message}")]
    Reply { code: u16, message: String },
    /// A reply could not be parsed
    #[error("Bad reply: {0}")]
    BadReply(String),
    /// A command argument cannot be sent on the control connection
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The control connection was closed in the middle of a reply
    #[error("Unexpected EOF on stream")]
    UnexpectedEof,
    /// Any errors related to I/O
    #[error("I/O: {0}")]
    IO(String),
    /// The configuration document could not be read or parsed
    #[error("Config: {0}")]
    Config(String),
}

impl From<Reply> for Error {
    fn from(reply: Reply) -> Self {
        Self::Reply {
            code: reply.code,
            message: reply.message(),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::UnexpectedEof,
            _ => Self::IO(err.to_string()),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}
