#![allow(clippy::len_without_is_empty)]

use crate::constants::ATTR_HEADER_LEN;
use crate::error::ParsePacketErr;
use crate::util::padded_len;
use bytes::{BufMut, Bytes, BytesMut};

pub mod address_attr;
pub mod software;
pub mod xor_address;

// type(2) + length(2) + value, the value is zero padded to 4 bytes.
// attr_len is the unpadded value length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttr {
    pub attr_type: u16,
    pub attr_len: u16,
    pub value: Bytes,
}

impl RawAttr {
    pub fn new(attr_type: u16, value: Bytes) -> Self {
        Self {
            attr_type,
            attr_len: value.len() as u16,
            value,
        }
    }

    pub fn padding(&self) -> usize {
        padded_len(self.attr_len as usize) - self.attr_len as usize
    }

    // on-wire span, padding included
    pub fn len(&self) -> usize {
        ATTR_HEADER_LEN + padded_len(self.attr_len as usize)
    }

    pub fn pack(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.len());

        buf.put_u16(self.attr_type);
        buf.put_u16(self.attr_len);
        buf.put_slice(&self.value);
        buf.put_bytes(0, self.padding());

        buf.freeze()
    }

    /// Decodes one attribute from the front of `buf`. Callers advance by
    /// `len()`, which includes the padding.
    pub fn unpack(buf: &[u8]) -> Result<Self, ParsePacketErr> {
        if buf.len() < ATTR_HEADER_LEN {
            return Err(ParsePacketErr::BufSize(format!(
                "attr buf len:{}",
                buf.len()
            )));
        }

        let mut index = 0_usize;
        let attr_type = u16::from_be_bytes([buf[index], buf[index + 1]]);

        index += 2;
        let attr_len = u16::from_be_bytes([buf[index], buf[index + 1]]);

        index += 2;
        let end = index + attr_len as usize;
        if buf.len() < end {
            return Err(ParsePacketErr::BufSize(format!(
                "attr buf len:{} < {}",
                buf.len(),
                end
            )));
        }

        let value = Bytes::copy_from_slice(&buf[index..end]);

        Ok(Self {
            attr_type,
            attr_len,
            value,
        })
    }
}
