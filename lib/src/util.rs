use crate::constants::{MAGIC_COOKIE, MAGIC_COOKIE_BYTES, TRANS_ID_LEN};
use crate::header::TransId;
use rand::prelude::*;
use std::fmt::Write as _;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};

pub fn print_bytes(buf: &[u8], separator: &str, row_width: usize) -> String {
    let mut hex = String::new();
    buf.iter().enumerate().for_each(|(x, y)| {
        let _ = write!(hex, "{:02X}", y);
        if (x + 1) % row_width == 0 {
            hex.push('\n');
        } else {
            hex.push_str(separator);
        }
    });

    hex
}

pub fn new_trans_id() -> TransId {
    let mut trans_id = [0u8; TRANS_ID_LEN];
    rand::thread_rng().fill_bytes(&mut trans_id);
    trans_id
}

// attribute values are padded to a multiple of 4 bytes
pub fn padded_len(len: usize) -> usize {
    match len % 4 {
        0 => len,
        v => len + 4 - v,
    }
}

// ::ffff:a.b.c.d is reported as a.b.c.d
pub fn normalize_addr(addr: SocketAddr) -> SocketAddr {
    match addr {
        SocketAddr::V6(v6) => match v6.ip().to_ipv4_mapped() {
            Some(ip) => SocketAddr::V4(SocketAddrV4::new(ip, v6.port())),
            None => addr,
        },
        v4 => v4,
    }
}

fn xor_port(port: u16) -> u16 {
    port ^ (MAGIC_COOKIE >> 16) as u16
}

pub fn xor_address_v4(addr: SocketAddrV4) -> SocketAddrV4 {
    let ip = u32::from(*addr.ip()) ^ MAGIC_COOKIE;
    SocketAddrV4::new(Ipv4Addr::from(ip), xor_port(addr.port()))
}

pub fn xor_address_v6(addr: SocketAddrV6, trans_id: &TransId) -> SocketAddrV6 {
    let src_buf = addr.ip().octets();
    let mut buf = [0_u8; 16];
    for i in 0..buf.len() {
        if i < MAGIC_COOKIE_BYTES.len() {
            buf[i] = src_buf[i] ^ MAGIC_COOKIE_BYTES[i];
        } else {
            buf[i] = src_buf[i] ^ trans_id[i - MAGIC_COOKIE_BYTES.len()];
        }
    }

    SocketAddrV6::new(Ipv6Addr::from(buf), xor_port(addr.port()), 0, 0)
}

// xor is its own inverse, the same call encodes and decodes
pub fn xor_address(addr: SocketAddr, trans_id: &TransId) -> SocketAddr {
    match addr {
        SocketAddr::V4(v) => SocketAddr::V4(xor_address_v4(v)),
        SocketAddr::V6(v) => SocketAddr::V6(xor_address_v6(v, trans_id)),
    }
}
