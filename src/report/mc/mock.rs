//! Single-shot fake game servers for exercising the ping client over real sockets.

use std::{
    io::Write,
    net::{TcpListener, TcpStream},
    thread::{self, JoinHandle},
    time::Duration,
};

use super::{
    bytes::encode_varint,
    packet::{frame, Packet},
};

/// The two frames a client sent, without their length prefixes.
pub struct Exchange {
    pub handshake: Vec<u8>,
    pub request: Vec<u8>,
}

pub fn status_server(json: impl Into<String>) -> (u16, JoinHandle<Exchange>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (port, answer_status(listener, json.into()))
}

/// Like [`status_server`] on a fixed port; `None` when the port is already taken.
pub fn status_server_on(port: u16, json: impl Into<String>) -> Option<JoinHandle<Exchange>> {
    let listener = TcpListener::bind(("127.0.0.1", port)).ok()?;
    Some(answer_status(listener, json.into()))
}

fn answer_status(listener: TcpListener, json: String) -> JoinHandle<Exchange> {
    accept_once(listener, move |mut stream| {
        let handshake = Packet::recv_frame(&mut stream).unwrap();
        let request = Packet::recv_frame(&mut stream).unwrap();

        let mut payload = vec![0x00];
        payload.extend(encode_varint(json.len() as u64));
        payload.extend_from_slice(json.as_bytes());
        stream.write_all(&frame(&payload)).unwrap();

        Exchange { handshake, request }
    })
}

/// Reads the client's two frames, writes `reply` as-is and hangs up.
pub fn raw_server(reply: Vec<u8>) -> u16 {
    let (port, _) = serve_once(move |mut stream| {
        Packet::recv_frame(&mut stream).unwrap();
        Packet::recv_frame(&mut stream).unwrap();
        stream.write_all(&reply).unwrap();
    });
    port
}

/// Accepts a connection and never answers.
pub fn silent_server(hold_for: Duration) -> u16 {
    let (port, _) = serve_once(move |stream| {
        thread::sleep(hold_for);
        drop(stream);
    });
    port
}

pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn serve_once<T, F>(handler: F) -> (u16, JoinHandle<T>)
where
    F: FnOnce(TcpStream) -> T + Send + 'static,
    T: Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (port, accept_once(listener, handler))
}

fn accept_once<T, F>(listener: TcpListener, handler: F) -> JoinHandle<T>
where
    F: FnOnce(TcpStream) -> T + Send + 'static,
    T: Send + 'static,
{
    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        handler(stream)
    })
}
