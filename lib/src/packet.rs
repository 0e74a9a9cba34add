use crate::attrs::address_attr::AddressAttr;
use crate::attrs::software::SoftwareAttr;
use crate::attrs::xor_address::XorMappedAddress;
use crate::attrs::RawAttr;
use crate::constants::*;
use crate::error::{Error, ParsePacketErr};
use crate::header::Header;
use bytes::{BufMut, Bytes, BytesMut};
use std::net::SocketAddr;

const MAX_ATTRS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub header: Header,
    pub attrs: Vec<RawAttr>,
}

impl Packet {
    pub fn new(header: Header, attrs: Vec<RawAttr>) -> Self {
        let mut packet = Self { header, attrs };
        packet.update_header_len();
        packet
    }

    // msg_len is only final once every attribute is in place
    fn update_header_len(&mut self) {
        let total = self.attrs.iter().fold(0_usize, |acc, x| acc + x.len());
        self.header.msg_len = total as u16;
    }

    pub fn add_attr(&mut self, attr: RawAttr) {
        self.attrs.push(attr);
        self.update_header_len();
    }

    pub fn pack(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.header.frame_len());
        buf.put_slice(&self.header.pack());
        for v in self.attrs.iter() {
            buf.put_slice(&v.pack());
        }

        buf.freeze()
    }

    pub fn unpack(buf: &[u8]) -> Result<Self, ParsePacketErr> {
        let header = Header::unpack(buf)?;
        let body = &buf[HEADER_LEN..];

        if header.msg_len as usize != body.len() {
            return Err(ParsePacketErr::NotMatch(format!(
                "header len:{} != {}",
                header.msg_len,
                body.len()
            )));
        }

        let mut attrs = vec![];
        let mut index = 0_usize;

        while index < body.len() {
            if attrs.len() == MAX_ATTRS {
                return Err(ParsePacketErr::TooManyAttrs);
            }

            let attr = RawAttr::unpack(&body[index..])?;
            index += attr.len();
            attrs.push(attr);
        }

        if index != body.len() {
            return Err(ParsePacketErr::NotMatch(format!(
                "packet data len:{} != packet msg len:{}",
                index, header.msg_len
            )));
        }

        Ok(Self { header, attrs })
    }

    pub fn find_attr(&self, attr_type: u16) -> Option<&RawAttr> {
        self.attrs.iter().find(|v| v.attr_type == attr_type)
    }

    pub fn mapped_address(&self) -> Result<SocketAddr, Error> {
        let attr: AddressAttr = self.require_attr(ATTR_MAPPED_ADDRESS)?.clone().try_into()?;
        Ok(attr.address)
    }

    pub fn xor_mapped_address(&self) -> Result<SocketAddr, Error> {
        let raw_attr = self.require_attr(ATTR_XOR_MAPPED_ADDRESS)?;
        let attr = XorMappedAddress::from_raw_attr(raw_attr, &self.header.trans_id)?;
        Ok(attr.address)
    }

    pub fn software(&self) -> Result<String, Error> {
        let attr: SoftwareAttr = self.require_attr(ATTR_SOFTWARE)?.clone().try_into()?;
        Ok(attr.text)
    }

    fn require_attr(&self, attr_type: u16) -> Result<&RawAttr, ParsePacketErr> {
        self.find_attr(attr_type).ok_or_else(|| {
            ParsePacketErr::NotMatch(format!("can't find attr: {:#06x}", attr_type))
        })
    }
}
