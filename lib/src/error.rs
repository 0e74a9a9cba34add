use std::fmt;

#[derive(Debug)]
pub enum Error {
    Parse(ParsePacketErr),
    Validate(ValidateErr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateErr(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsePacketErr {
    // length or value mismatch
    NotMatch(String),

    // buffer too short
    BufSize(String),

    // field value out of range
    BadValue(String),

    NotUtf8,

    TooManyAttrs,
}

impl From<ParsePacketErr> for Error {
    fn from(e: ParsePacketErr) -> Self {
        Error::Parse(e)
    }
}

impl From<ValidateErr> for Error {
    fn from(e: ValidateErr) -> Self {
        Error::Validate(e)
    }
}

impl fmt::Display for ValidateErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "parse error, {:?}", e),
            Error::Validate(e) => write!(f, "validate error, {}", e),
        }
    }
}

impl std::error::Error for Error {}
