use crate::attrs::RawAttr;
use crate::constants::*;
use crate::error::ParsePacketErr;
use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareAttr {
    pub text: String,
}

impl SoftwareAttr {
    pub fn new(text: &str) -> Self {
        Self {
            text: truncate_utf8(text, SOFTWARE_MAX_LEN).to_string(),
        }
    }

    /// "NatPoker 0.1, <url>"
    pub fn server_identity() -> Self {
        Self::new(&format!("{} {}, {}", NP_NAME, NP_VERSION, NP_URL))
    }
}

fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

impl From<SoftwareAttr> for RawAttr {
    fn from(attr: SoftwareAttr) -> Self {
        RawAttr::new(ATTR_SOFTWARE, Bytes::from(attr.text))
    }
}

impl TryFrom<RawAttr> for SoftwareAttr {
    type Error = ParsePacketErr;

    fn try_from(raw_attr: RawAttr) -> Result<Self, Self::Error> {
        match String::from_utf8(raw_attr.value.to_vec()) {
            Ok(text) => Ok(Self { text }),
            Err(_e) => Err(ParsePacketErr::NotUtf8),
        }
    }
}
