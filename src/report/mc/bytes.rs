use std::io::Read;

use bytes::{Buf, BufMut};

use crate::error::PingError;

/// A u64 needs ten 7-bit groups.
pub const MAX_VARINT_LEN: usize = 10;
const CONTINUATION_BIT: u8 = 0x80;
const SEGMENT_BITS: u8 = 0x7f;

pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAX_VARINT_LEN);
    leb128::write::unsigned(&mut buf, value).expect("writing into a Vec cannot fail");
    buf
}

/// Decodes a varint from the front of `buf`, returning its value and encoded width.
pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize), PingError> {
    let mut value = 0;
    for (index, &byte) in buf.iter().take(MAX_VARINT_LEN).enumerate() {
        value = accumulate(value, index, byte)?;
        if byte & CONTINUATION_BIT == 0 {
            return Ok((value, index + 1));
        }
    }

    Err(PingError::MalformedVarint)
}

/// Reads a varint one byte at a time so nothing past its last byte is consumed.
pub fn read_varint<R: Read>(reader: &mut R) -> Result<(u64, usize), PingError> {
    let mut value = 0;
    let mut byte = [0u8; 1];
    for index in 0..MAX_VARINT_LEN {
        reader.read_exact(&mut byte).map_err(|err| match err.kind() {
            std::io::ErrorKind::UnexpectedEof => PingError::MalformedVarint,
            _ => PingError::read(err),
        })?;

        value = accumulate(value, index, byte[0])?;
        if byte[0] & CONTINUATION_BIT == 0 {
            return Ok((value, index + 1));
        }
    }

    Err(PingError::MalformedVarint)
}

fn accumulate(value: u64, index: usize, byte: u8) -> Result<u64, PingError> {
    // the last group only has room for the top bit
    if index == MAX_VARINT_LEN - 1 && byte > 1 {
        return Err(PingError::MalformedVarint);
    }

    Ok(value | (u64::from(byte & SEGMENT_BITS) << (7 * index)))
}

#[derive(Debug)]
pub struct Bytes(bytes::BytesMut);
unsafe impl BufMut for Bytes {
    fn remaining_mut(&self) -> usize {
        self.0.remaining_mut()
    }

    unsafe fn advance_mut(&mut self, cnt: usize) {
        self.0.advance_mut(cnt)
    }

    fn chunk_mut(&mut self) -> &mut bytes::buf::UninitSlice {
        self.0.chunk_mut()
    }
}

impl Buf for Bytes {
    fn remaining(&self) -> usize {
        self.0.remaining()
    }

    fn chunk(&self) -> &[u8] {
        self.0.chunk()
    }

    fn advance(&mut self, cnt: usize) {
        self.0.advance(cnt)
    }
}

impl Bytes {
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Bytes {
    pub fn get_varint(&mut self) -> Result<u64, PingError> {
        let (value, width) = decode_varint(self.chunk())?;
        self.advance(width);
        Ok(value)
    }
}

impl Bytes {
    pub fn put_varint(&mut self, value: u64) {
        self.put_slice(&encode_varint(value));
    }

    pub fn put_string(&mut self, string: &str) {
        self.put_varint(string.len() as u64);
        self.put_slice(string.as_bytes());
    }
}

impl<'a> From<&'a [u8]> for Bytes {
    fn from(value: &[u8]) -> Self {
        Bytes(value.into())
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(value: Vec<u8>) -> Self {
        value.as_slice().into()
    }
}

impl From<Bytes> for Vec<u8> {
    fn from(value: Bytes) -> Self {
        value.0.into()
    }
}
