use std::{
    io::{self, BufReader, Read, Write},
    net::{TcpStream, ToSocketAddrs},
    result,
    time::{Duration, Instant},
};

use axum::{
    extract::{rejection::PathRejection, Path, RawQuery, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::error::{Error, PingError};

use self::{
    packet::{
        handshake::Handshake,
        status::{StatusRequest, StatusResponse},
        Packet, SendPacket,
    },
    status::Status,
};

pub mod bytes;
pub mod packet;
pub mod status;

#[cfg(test)]
pub(crate) mod mock;

pub const DEFAULT_PORT: u16 = 25565;

type Result<T> = result::Result<T, PingError>;

/// Runs one Server List Ping exchange against `host:port` and returns the server's raw status
/// JSON. Connecting, both writes and the read share a single deadline `timeout` from now.
pub fn ping(host: &str, port: u16, timeout: Duration) -> Result<String> {
    let deadline = Deadline::after(timeout);
    let mut stream = DeadlineStream::connect(host, port, deadline)?;

    Handshake::status(host, port).send_packet(&mut stream)?;

    StatusRequest.send_packet(&mut stream)?;

    let frame = Packet::recv_frame(&mut BufReader::new(&mut stream))?;
    let response = StatusResponse::try_from(frame)?;
    tracing::debug!(
        host,
        port,
        packet_id = response.id,
        declared_length = response.declared_length,
        bytes = response.json.len(),
        "received status"
    );

    Ok(response.json)
}

#[derive(Debug, Clone, Copy)]
struct Deadline(Instant);

impl Deadline {
    fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    fn time_left(&self) -> io::Result<Duration> {
        let left = self.0.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "deadline exceeded"));
        }
        Ok(left)
    }
}

/// A TCP stream whose every read and write is bounded by the time left until one deadline.
struct DeadlineStream {
    stream: TcpStream,
    deadline: Deadline,
}

impl DeadlineStream {
    fn connect(host: &str, port: u16, deadline: Deadline) -> Result<Self> {
        let addrs = (host, port).to_socket_addrs().map_err(PingError::connect)?;

        let mut last_error = PingError::Connect(format!("no addresses found for {host}"));
        for addr in addrs {
            let time_left = deadline.time_left().map_err(PingError::connect)?;
            match TcpStream::connect_timeout(&addr, time_left) {
                Ok(stream) => return Ok(Self { stream, deadline }),
                Err(err) => last_error = PingError::connect(err),
            }
        }

        Err(last_error)
    }
}

impl Read for DeadlineStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream
            .set_read_timeout(Some(self.deadline.time_left()?))?;
        self.stream.read(buf)
    }
}

impl Write for DeadlineStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream
            .set_write_timeout(Some(self.deadline.time_left()?))?;
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Parses a path segment as a port, falling back to the default game port.
pub fn parse_port(port: &str) -> u16 {
    port.parse().unwrap_or(DEFAULT_PORT)
}

#[derive(Debug, Clone, Copy)]
pub struct PingState {
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct Target {
    server: String,
    #[serde(default)]
    port: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PingOptions {
    pretty: bool,
}

impl PingOptions {
    /// Only `pretty=true` turns pretty printing on; any other value or shape is ignored.
    pub fn from_query(query: Option<&str>) -> Self {
        let pretty = query
            .unwrap_or_default()
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .any(|(key, value)| key == "pretty" && value == "true");
        Self { pretty }
    }
}

/// Answers `GET /:server`, `GET /:server/` and `GET /:server/:port`. Failures are reported in
/// the body with a `200`, the same channel as a successful status document.
pub async fn status_route(
    State(state): State<PingState>,
    target: result::Result<Path<Target>, PathRejection>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let body = match target {
        Ok(Path(target)) => {
            status_body(target, PingOptions::from_query(query.as_deref()), state).await
        }
        Err(rejection) => rejection.body_text(),
    };

    ([(header::CONTENT_TYPE, "application/json")], body)
}

async fn status_body(target: Target, options: PingOptions, state: PingState) -> String {
    let port = parse_port(&target.port);
    match ping_blocking(target.server.clone(), port, state.timeout).await {
        Ok(json) if options.pretty => reencode(&json),
        Ok(json) => json,
        Err(err) => {
            tracing::warn!(server = %target.server, port, "ping failed: {err}");
            err.to_string()
        }
    }
}

async fn ping_blocking(
    host: String,
    port: u16,
    timeout: Duration,
) -> result::Result<String, Error> {
    tracing::debug!(%host, port, "pinging");
    Ok(tokio::task::spawn_blocking(move || ping(&host, port, timeout)).await??)
}

fn reencode(json: &str) -> String {
    match Status::decode(json.as_bytes()).and_then(|status| status.encode()) {
        Ok(pretty) => pretty,
        Err(err) => err.to_string(),
    }
}
