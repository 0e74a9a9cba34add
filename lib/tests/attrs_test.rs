use std::net::SocketAddr;

use natpoker_stun::attrs::address_attr::AddressAttr;
use natpoker_stun::attrs::software::SoftwareAttr;
use natpoker_stun::attrs::xor_address::XorMappedAddress;
use natpoker_stun::attrs::RawAttr;
use natpoker_stun::constants::*;
use natpoker_stun::error::ParsePacketErr;
use natpoker_stun::util;

// rfc 5769, 2.2 and 2.3
const TRANS_ID: [u8; 12] = [
    0xb7, 0xe7, 0xa7, 0x01, 0xbc, 0x34, 0xd6, 0x86, 0xfa, 0x87, 0xdf, 0xae,
];

#[test]
pub fn test_mapped_address_ipv4() {
    let addr: SocketAddr = "192.0.2.1:32853".parse().unwrap();
    let raw: RawAttr = AddressAttr::mapped(addr).into();
    let buf = raw.pack();

    assert_eq!(
        &buf[..],
        &[0x00, 0x01, 0x00, 0x08, 0x00, 0x01, 0x80, 0x55, 0xc0, 0x00, 0x02, 0x01]
    );
}

#[test]
pub fn test_mapped_address_ipv6() {
    let addr: SocketAddr = "[2001:db8:1234:5678:11:2233:4455:6677]:32853"
        .parse()
        .unwrap();
    let raw: RawAttr = AddressAttr::mapped(addr).into();
    let buf = raw.pack();

    assert_eq!(raw.attr_len, 20);
    assert_eq!(buf.len(), 24);
    assert_eq!(&buf[4..8], &[0x00, 0x02, 0x80, 0x55]);
    assert_eq!(&buf[8..12], &[0x20, 0x01, 0x0d, 0xb8]);

    let decoded: AddressAttr = RawAttr::unpack(&buf).unwrap().try_into().unwrap();
    assert_eq!(decoded.address, addr);
}

#[test]
pub fn test_xor_mapped_address_ipv4_vector() {
    let addr: SocketAddr = "192.0.2.1:32853".parse().unwrap();
    let raw: RawAttr = XorMappedAddress::new(TRANS_ID, addr).into();

    assert_eq!(
        &raw.pack()[..],
        &[0x00, 0x20, 0x00, 0x08, 0x00, 0x01, 0xa1, 0x47, 0xe1, 0x12, 0xa6, 0x43]
    );
}

#[test]
pub fn test_xor_mapped_address_ipv6_vector() {
    let addr: SocketAddr = "[2001:db8:1234:5678:11:2233:4455:6677]:32853"
        .parse()
        .unwrap();
    let raw: RawAttr = XorMappedAddress::new(TRANS_ID, addr).into();

    let expected = [
        0x00, 0x20, 0x00, 0x14, 0x00, 0x02, 0xa1, 0x47, 0x01, 0x13, 0xa9, 0xfa, 0xa5, 0xd3,
        0xf1, 0x79, 0xbc, 0x25, 0xf4, 0xb5, 0xbe, 0xd2, 0xb9, 0xd9,
    ];
    assert_eq!(&raw.pack()[..], &expected[..]);

    let decoded = XorMappedAddress::from_raw_attr(&raw, &TRANS_ID).unwrap();
    assert_eq!(decoded.address, addr);
}

#[test]
pub fn test_xor_decode_needs_matching_trans_id() {
    let addr: SocketAddr = "[2001:db8::1]:3478".parse().unwrap();
    let raw: RawAttr = XorMappedAddress::new(TRANS_ID, addr).into();

    let other_id = util::new_trans_id();
    let decoded = XorMappedAddress::from_raw_attr(&raw, &other_id).unwrap();
    if other_id != TRANS_ID {
        assert_ne!(decoded.address, addr);
    }
    // port only depends on the cookie
    assert_eq!(decoded.address.port(), 3478);
}

#[test]
pub fn test_bad_family() {
    let raw = RawAttr::unpack(&[0x00, 0x01, 0x00, 0x08, 0x00, 0x03, 0x0d, 0x96, 1, 2, 3, 4])
        .unwrap();
    let err = AddressAttr::try_from(raw).unwrap_err();
    assert!(matches!(err, ParsePacketErr::BadValue(_)));
}

#[test]
pub fn test_software_padding() {
    let attr = SoftwareAttr::server_identity();
    let text = attr.text.clone();
    assert_eq!(text, "NatPoker 0.1, https://github.com/sdstrowes/natpoker-srv");

    let raw: RawAttr = attr.into();
    assert_eq!(raw.attr_type, ATTR_SOFTWARE);
    assert_eq!(raw.attr_len as usize, text.len());
    assert_eq!(raw.len() % 4, 0);

    let buf = raw.pack();
    assert_eq!(buf.len(), raw.len());
    assert_eq!(u16::from_be_bytes([buf[2], buf[3]]) as usize, text.len());
    assert_eq!(&buf[4..4 + text.len()], text.as_bytes());
    assert!(buf[4 + text.len()..].iter().all(|b| *b == 0));
}

#[test]
pub fn test_software_aligned_text_has_no_padding() {
    let raw: RawAttr = SoftwareAttr::new("abcdefgh").into();
    assert_eq!(raw.padding(), 0);
    assert_eq!(raw.pack().len(), 12);
}

#[test]
pub fn test_software_truncated_on_char_boundary() {
    let long = "é".repeat(500);
    let attr = SoftwareAttr::new(&long);
    assert!(attr.text.len() <= SOFTWARE_MAX_LEN);
    assert_eq!(attr.text.len(), 762);
}

#[test]
pub fn test_software_not_utf8() {
    let raw = RawAttr::unpack(&[0x80, 0x22, 0x00, 0x02, 0xff, 0xfe, 0x00, 0x00]).unwrap();
    let err = SoftwareAttr::try_from(raw).unwrap_err();
    assert_eq!(err, ParsePacketErr::NotUtf8);
}

#[test]
pub fn test_normalize_mapped_ipv4() {
    let mapped: SocketAddr = "[::ffff:198.51.100.7]:40000".parse().unwrap();
    let expected: SocketAddr = "198.51.100.7:40000".parse().unwrap();
    assert_eq!(util::normalize_addr(mapped), expected);

    let v6: SocketAddr = "[2001:db8::7]:40000".parse().unwrap();
    assert_eq!(util::normalize_addr(v6), v6);
}
