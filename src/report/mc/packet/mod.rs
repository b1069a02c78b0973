pub mod handshake;
pub mod status;

use std::io::{Read, Write};

use crate::error::PingError;

use super::bytes::{encode_varint, read_varint, Bytes};

/// Upper bound on an inbound frame; status documents are a few KiB at most.
pub const MAX_FRAME_LEN: u64 = 2 * 1024 * 1024;

#[derive(Debug)]
pub struct Packet {
    pub id: u8,
    pub data: Bytes,
}

/// Prefixes `payload` with its varint-encoded length.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut framed = encode_varint(payload.len() as u64);
    framed.extend_from_slice(payload);
    framed
}

pub trait SendPacket {
    fn send_packet<W: Write>(self, stream: &mut W) -> Result<(), PingError>
    where
        Self: Sized + Into<Packet>,
    {
        self.into().send(stream)
    }
}

impl Packet {
    pub fn send<W: Write>(self, stream: &mut W) -> Result<(), PingError> {
        let data: Vec<u8> = self.into();
        stream.write_all(&data).map_err(PingError::write)?;
        stream.flush().map_err(PingError::write)
    }

    /// Reads one length-prefixed frame and returns its body.
    pub fn recv_frame<R: Read>(stream: &mut R) -> Result<Vec<u8>, PingError> {
        let (length, _) = read_varint(stream)?;
        if length > MAX_FRAME_LEN {
            return Err(PingError::Read(format!(
                "frame of {length} bytes exceeds the {MAX_FRAME_LEN} byte limit"
            )));
        }

        let mut buffer = vec![0u8; length as usize];
        stream.read_exact(&mut buffer).map_err(PingError::read)?;
        Ok(buffer)
    }
}

impl From<Packet> for Vec<u8> {
    fn from(packet: Packet) -> Self {
        let mut payload = Vec::with_capacity(1 + packet.data.len());
        payload.push(packet.id);
        payload.extend(Vec::<u8>::from(packet.data));

        frame(&payload)
    }
}
