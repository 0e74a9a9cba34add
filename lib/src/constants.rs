// 0x2112A442
pub const MAGIC_COOKIE: u32 = 0x2112_A442;
pub const MAGIC_COOKIE_BYTES: [u8; 4] = MAGIC_COOKIE.to_be_bytes();

pub const TRANS_ID_LEN: usize = 12;
pub const HEADER_LEN: usize = 20;
pub const ATTR_HEADER_LEN: usize = 4;

pub const MESSAGE_TYPE_BIND_REQ: u16 = 0x0001;
pub const MESSAGE_TYPE_BIND_RES: u16 = 0x0101;

pub const ATTR_FAMILY_IPV4: u8 = 0x01;
pub const ATTR_FAMILY_IPV6: u8 = 0x02;

pub const ATTR_MAPPED_ADDRESS: u16 = 0x0001;
pub const ATTR_XOR_MAPPED_ADDRESS: u16 = 0x0020;
pub const ATTR_SOFTWARE: u16 = 0x8022;

// rfc 5389, 15.10
pub const SOFTWARE_MAX_LEN: usize = 763;

pub const NP_NAME: &str = "NatPoker";
pub const NP_VERSION: &str = "0.1";
pub const NP_URL: &str = "https://github.com/sdstrowes/natpoker-srv";

pub const BUFFER_SIZE: usize = 1280;
pub const DEFAULT_PORT: u16 = 3478;
