use bytes::Bytes;
use log::debug;
use std::net::SocketAddr;

use natpoker_stun::attrs::address_attr::AddressAttr;
use natpoker_stun::attrs::software::SoftwareAttr;
use natpoker_stun::attrs::xor_address::XorMappedAddress;
use natpoker_stun::constants::*;
use natpoker_stun::error::{Error, ValidateErr};
use natpoker_stun::header::Header;
use natpoker_stun::packet::Packet;
use natpoker_stun::util::normalize_addr;

pub fn validate_req(req: &Header) -> Option<ValidateErr> {
    req.validate(MESSAGE_TYPE_BIND_REQ)
}

// mapped-address, xor-mapped-address, software; nothing else is ever sent
pub fn get_response(req: &Header, remote_addr: SocketAddr) -> Packet {
    let trans_id = req.trans_id;
    let header = Header::new(MESSAGE_TYPE_BIND_RES, 0, trans_id);
    let remote_addr = normalize_addr(remote_addr);

    let attrs = vec![
        AddressAttr::mapped(remote_addr).into(),
        XorMappedAddress::new(trans_id, remote_addr).into(),
        SoftwareAttr::server_identity().into(),
    ];

    Packet::new(header, attrs)
}

/// Parses and validates the request header in `buf` and returns the packed
/// response. Request attributes are never looked at.
pub fn handle_request(buf: &[u8], remote_addr: SocketAddr) -> Result<Bytes, Error> {
    let req = Header::unpack(buf)?;

    if let Some(e) = validate_req(&req) {
        return Err(e.into());
    }

    debug!(
        "binding request from {}, trans_id: {:02x?}",
        remote_addr, req.trans_id
    );

    Ok(get_response(&req, remote_addr).pack())
}
