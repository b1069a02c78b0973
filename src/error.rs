use std::{io, net::AddrParseError, num::ParseIntError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("generic error: {0}")]
    Generic(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("error parsing json: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("address parsing error: {0}")]
    AddrParse(#[from] AddrParseError),
    #[error("int parsing error: {0}")]
    ParseInt(#[from] ParseIntError),
    #[error("http error: {0}")]
    Http(#[from] hyper::Error),
    #[error("invalid uri: {0}")]
    Uri(#[from] hyper::http::uri::InvalidUri),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Ping(#[from] PingError),
}

/// Everything that can go wrong during a single status exchange with a game server.
#[derive(Debug, thiserror::Error)]
pub enum PingError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("i/o timeout")]
    Timeout,
    #[error("malformed varint")]
    MalformedVarint,
    #[error("read failed: {0}")]
    Read(String),
    #[error("write failed: {0}")]
    Write(String),
}

impl PingError {
    pub fn connect(err: io::Error) -> Self {
        if is_timeout(&err) {
            PingError::Timeout
        } else {
            PingError::Connect(err.to_string())
        }
    }

    pub fn read(err: io::Error) -> Self {
        match err.kind() {
            _ if is_timeout(&err) => PingError::Timeout,
            io::ErrorKind::UnexpectedEof => {
                PingError::Read("connection closed before the full response arrived".to_owned())
            }
            _ => PingError::Read(err.to_string()),
        }
    }

    pub fn write(err: io::Error) -> Self {
        if is_timeout(&err) {
            PingError::Timeout
        } else {
            PingError::Write(err.to_string())
        }
    }
}

// Unix reports an expired socket timeout as WouldBlock, Windows as TimedOut.
fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}
