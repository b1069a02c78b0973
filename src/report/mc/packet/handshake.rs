use bytes::BufMut;

use crate::report::mc::bytes::Bytes;

use super::{Packet, SendPacket};

/// Protocol version announced in the handshake. Servers of every generation answer a status
/// request for it, even when they would refuse a login with it.
pub const LEGACY_PROTOCOL_VERSION: u64 = 0x47;

pub struct Handshake {
    pub protocol_version: u64,
    pub server_address: String,
    pub server_port: u16,
    pub next_state: NextState,
}

pub enum NextState {
    Status,
}

impl Handshake {
    pub fn status(server_address: &str, server_port: u16) -> Self {
        Self {
            protocol_version: LEGACY_PROTOCOL_VERSION,
            server_address: server_address.to_owned(),
            server_port,
            next_state: NextState::Status,
        }
    }
}
impl SendPacket for Handshake {}

impl From<Handshake> for Bytes {
    fn from(data: Handshake) -> Self {
        let mut handshake_data: Bytes = vec![].into();
        handshake_data.put_varint(data.protocol_version);
        handshake_data.put_string(&data.server_address);
        handshake_data.put_u16(data.server_port);
        handshake_data.put_u8(match data.next_state {
            NextState::Status => 0x01,
        });
        handshake_data
    }
}

impl From<Handshake> for Packet {
    fn from(data: Handshake) -> Self {
        Self {
            id: 0x00,
            data: data.into(),
        }
    }
}
