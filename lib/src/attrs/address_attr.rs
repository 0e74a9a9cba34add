use crate::attrs::RawAttr;
use crate::constants::*;
use crate::error::ParsePacketErr;
use bytes::{BufMut, Bytes, BytesMut};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

// mapped-address
//
// 0x00 | family | port(2) | address(4 or 16)
// ipv4: family 0x01, value 8 bytes
// ipv6: family 0x02, value 20 bytes

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressAttr {
    pub attr_type: u16,
    pub address: SocketAddr,
}

impl AddressAttr {
    pub fn new(attr_type: u16, address: SocketAddr) -> Self {
        Self { attr_type, address }
    }

    pub fn mapped(address: SocketAddr) -> Self {
        Self::new(ATTR_MAPPED_ADDRESS, address)
    }
}

// shared with xor-mapped-address, which writes already obfuscated values
pub(crate) fn pack_address(address: &SocketAddr) -> Bytes {
    let (family, ip_bytes): (u8, Vec<u8>) = match address.ip() {
        IpAddr::V4(ip) => (ATTR_FAMILY_IPV4, ip.octets().into()),
        IpAddr::V6(ip) => (ATTR_FAMILY_IPV6, ip.octets().into()),
    };

    let mut bytes_buf = BytesMut::with_capacity(4 + ip_bytes.len());

    bytes_buf.put_u8(0);
    bytes_buf.put_u8(family);
    bytes_buf.put_u16(address.port());
    bytes_buf.put_slice(&ip_bytes);
    bytes_buf.freeze()
}

pub(crate) fn unpack_address(value: &[u8]) -> Result<SocketAddr, ParsePacketErr> {
    if value.len() < 4 {
        return Err(ParsePacketErr::BufSize(format!(
            "address attr buf len:{}",
            value.len()
        )));
    }

    let family = value[1];
    let port = u16::from_be_bytes([value[2], value[3]]);
    let index = 4_usize;

    let ip = match family {
        ATTR_FAMILY_IPV4 => {
            if value.len() != index + 4 {
                return Err(ParsePacketErr::NotMatch(format!(
                    "ipv4 address attr len:{} != 8",
                    value.len()
                )));
            }
            let mut addr = [0_u8; 4];
            addr.copy_from_slice(&value[index..index + 4]);
            IpAddr::V4(Ipv4Addr::from(addr))
        }
        ATTR_FAMILY_IPV6 => {
            if value.len() != index + 16 {
                return Err(ParsePacketErr::NotMatch(format!(
                    "ipv6 address attr len:{} != 20",
                    value.len()
                )));
            }
            let mut addr = [0_u8; 16];
            addr.copy_from_slice(&value[index..index + 16]);
            IpAddr::V6(Ipv6Addr::from(addr))
        }
        v => {
            return Err(ParsePacketErr::BadValue(format!("ip family: {}", v)));
        }
    };

    Ok(SocketAddr::new(ip, port))
}

impl From<AddressAttr> for RawAttr {
    fn from(attr: AddressAttr) -> Self {
        RawAttr::new(attr.attr_type, pack_address(&attr.address))
    }
}

impl TryFrom<RawAttr> for AddressAttr {
    type Error = ParsePacketErr;

    fn try_from(raw_attr: RawAttr) -> Result<Self, Self::Error> {
        let address = unpack_address(&raw_attr.value)?;
        Ok(Self {
            attr_type: raw_attr.attr_type,
            address,
        })
    }
}
