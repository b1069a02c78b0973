use bytes::Buf;

use crate::{error::PingError, report::mc::bytes::Bytes};

use super::{Packet, SendPacket};

#[derive(Default)]
pub struct StatusRequest;
impl SendPacket for StatusRequest {}

impl From<StatusRequest> for Bytes {
    fn from(_: StatusRequest) -> Self {
        vec![].into()
    }
}

impl From<StatusRequest> for Packet {
    fn from(data: StatusRequest) -> Self {
        Self {
            id: 0x00,
            data: data.into(),
        }
    }
}

/// The body of a status response frame: packet id, a length field, then the JSON document.
#[derive(Debug)]
pub struct StatusResponse {
    pub id: u64,
    pub declared_length: u64,
    pub json: String,
}

impl TryFrom<Vec<u8>> for StatusResponse {
    type Error = PingError;

    fn try_from(frame: Vec<u8>) -> Result<Self, Self::Error> {
        let mut data: Bytes = frame.into();
        let id = data.get_varint()?;
        // Only skipped. Whatever follows it is the document, even if the lengths disagree.
        let declared_length = data.get_varint()?;
        let json = String::from_utf8_lossy(data.chunk()).into_owned();

        if declared_length != json.len() as u64 {
            tracing::debug!(
                declared_length,
                actual_length = json.len(),
                "status response length field does not match its payload"
            );
        }

        Ok(Self {
            id,
            declared_length,
            json,
        })
    }
}
