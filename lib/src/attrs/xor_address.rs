use crate::attrs::address_attr::{pack_address, unpack_address};
use crate::attrs::RawAttr;
use crate::constants::*;
use std::net::SocketAddr;

use crate::error::ParsePacketErr;
use crate::header::TransId;
use crate::util;

// xor-mapped-address, same layout as mapped-address with obfuscated fields
// port: xor with the top 16 bits of the magic cookie
// address(ipv4): xor with the magic cookie
// address(ipv6): xor with the magic cookie followed by the transaction id

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorMappedAddress {
    pub address: SocketAddr,
    pub trans_id: TransId,
}

impl XorMappedAddress {
    pub fn new(trans_id: TransId, address: SocketAddr) -> Self {
        Self { trans_id, address }
    }

    pub fn from_raw_attr(raw_attr: &RawAttr, trans_id: &TransId) -> Result<Self, ParsePacketErr> {
        if raw_attr.attr_type != ATTR_XOR_MAPPED_ADDRESS {
            return Err(ParsePacketErr::NotMatch(format!(
                "attr type:{:#06x} is not xor-mapped-address",
                raw_attr.attr_type
            )));
        }

        let xored = unpack_address(&raw_attr.value)?;

        Ok(Self {
            address: util::xor_address(xored, trans_id),
            trans_id: *trans_id,
        })
    }
}

impl From<XorMappedAddress> for RawAttr {
    fn from(attr: XorMappedAddress) -> Self {
        let xored = util::xor_address(attr.address, &attr.trans_id);
        RawAttr::new(ATTR_XOR_MAPPED_ADDRESS, pack_address(&xored))
    }
}
