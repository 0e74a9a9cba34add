#![allow(clippy::len_without_is_empty)]

use crate::constants::*;
use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{ParsePacketErr, ValidateErr};

pub type TransId = [u8; TRANS_ID_LEN];

// rfc 5389, 6
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |0 0|     STUN Message Type     |         Message Length        |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                         Magic Cookie                          |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                     Transaction ID (96 bits)                  |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub msg_type: u16,

    // attribute bytes only, the 20 header bytes are not counted
    pub msg_len: u16,

    pub cookie: u32,

    pub trans_id: TransId,
}

impl Header {
    pub fn new(msg_type: u16, msg_len: u16, trans_id: TransId) -> Self {
        Self {
            msg_type,
            msg_len,
            cookie: MAGIC_COOKIE,
            trans_id,
        }
    }

    pub fn len(&self) -> usize {
        HEADER_LEN
    }

    /// Bytes needed for the whole message this header announces.
    pub fn frame_len(&self) -> usize {
        HEADER_LEN + self.msg_len as usize
    }

    pub fn pack(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_LEN);
        buf.put_u16(self.msg_type);
        buf.put_u16(self.msg_len);
        buf.put_u32(self.cookie);
        buf.put_slice(&self.trans_id);
        buf.freeze()
    }

    /// Reads the first 20 bytes of `buf`. Anything after them is left alone.
    pub fn unpack(buf: &[u8]) -> Result<Self, ParsePacketErr> {
        // length only, validity is checked by validate()
        if buf.len() < HEADER_LEN {
            return Err(ParsePacketErr::BufSize(format!(
                "header buf len:{} < {}",
                buf.len(),
                HEADER_LEN
            )));
        }

        let mut index = 0_usize;
        let msg_type = u16::from_be_bytes([buf[index], buf[index + 1]]);

        index += 2;
        let msg_len = u16::from_be_bytes([buf[index], buf[index + 1]]);

        index += 2;
        let cookie = u32::from_be_bytes([
            buf[index],
            buf[index + 1],
            buf[index + 2],
            buf[index + 3],
        ]);

        index += 4;
        let mut trans_id = [0_u8; TRANS_ID_LEN];
        trans_id.copy_from_slice(&buf[index..index + TRANS_ID_LEN]);

        Ok(Self {
            msg_type,
            msg_len,
            cookie,
            trans_id,
        })
    }

    pub fn validate(&self, expected_type: u16) -> Option<ValidateErr> {
        if self.msg_type != expected_type {
            let err_msg = format!("unknown message type: {:#06x}", self.msg_type);
            return Some(ValidateErr(err_msg));
        }

        if self.cookie != MAGIC_COOKIE {
            let err_msg = format!("bad magic cookie: {:#010x}", self.cookie);
            return Some(ValidateErr(err_msg));
        }

        None
    }
}
