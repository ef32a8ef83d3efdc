// Values from IrDA OBEX 1.3, sections 2 and 3

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

pub const FINAL_BIT: u8 = 0x80;

/// Response code byte followed by the 16-bit packet length.
pub const RESPONSE_PREFIX: usize = 3;

#[derive(TryFromPrimitive, IntoPrimitive, Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Connect = 0x00,
    Disconnect = 0x01,
    Put = 0x02,
    Get = 0x03,
    SetPath = 0x05,
    Session = 0x07,
    Abort = 0x7f,
}

#[derive(TryFromPrimitive, IntoPrimitive, Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseCode {
    Continue = 0x90,
    Success = 0xa0,
    Created = 0xa1,
    Accepted = 0xa2,
    NonAuthoritative = 0xa3,
    NoContent = 0xa4,
    ResetContent = 0xa5,
    PartialContent = 0xa6,
    MultipleChoices = 0xb0,
    MovedPermanently = 0xb1,
    MovedTemporarily = 0xb2,
    SeeOther = 0xb3,
    NotModified = 0xb4,
    UseProxy = 0xb5,
    BadRequest = 0xc0,
    Unauthorized = 0xc1,
    PaymentRequired = 0xc2,
    Forbidden = 0xc3,
    NotFound = 0xc4,
    MethodNotAllowed = 0xc5,
    NotAcceptable = 0xc6,
    ProxyAuthRequired = 0xc7,
    RequestTimeout = 0xc8,
    Conflict = 0xc9,
    Gone = 0xca,
    LengthRequired = 0xcb,
    PreconditionFailed = 0xcc,
    EntityTooLarge = 0xcd,
    UriTooLarge = 0xce,
    UnsupportedMediaType = 0xcf,
    InternalServerError = 0xd0,
    NotImplemented = 0xd1,
    BadGateway = 0xd2,
    ServiceUnavailable = 0xd3,
    GatewayTimeout = 0xd4,
    VersionNotSupported = 0xd5,
    DatabaseFull = 0xe0,
    DatabaseLocked = 0xe1,
}

/// How a header value is laid out on the wire, given by the two high bits of its id.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HeaderEncoding {
    Unicode,
    Bytes,
    Byte,
    FourByte,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HeaderId(pub u8);

impl Opcode {
    pub fn with_final(self, is_final: bool) -> u8 {
        let opcode = u8::from(self);
        if is_final {
            opcode | FINAL_BIT
        } else {
            opcode
        }
    }
}

pub fn is_final(opcode: u8) -> bool {
    opcode & FINAL_BIT != 0
}

impl ResponseCode {
    pub fn is_error(self) -> bool {
        !matches!(self, ResponseCode::Continue | ResponseCode::Success)
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "0x{:02x} {:?}", u8::from(*self), self)
    }
}

impl HeaderId {
    pub const COUNT: HeaderId = HeaderId(0xc0);
    pub const NAME: HeaderId = HeaderId(0x01);
    pub const TYPE: HeaderId = HeaderId(0x42);
    pub const LENGTH: HeaderId = HeaderId(0xc3);
    pub const TIME_ISO_8601: HeaderId = HeaderId(0x44);
    pub const TIME_4_BYTE: HeaderId = HeaderId(0xc4);
    pub const DESCRIPTION: HeaderId = HeaderId(0x05);
    pub const TARGET: HeaderId = HeaderId(0x46);
    pub const HTTP: HeaderId = HeaderId(0x47);
    pub const BODY: HeaderId = HeaderId(0x48);
    pub const END_OF_BODY: HeaderId = HeaderId(0x49);
    pub const WHO: HeaderId = HeaderId(0x4a);
    pub const CONNECTION_ID: HeaderId = HeaderId(0xcb);
    pub const APP_PARAMETERS: HeaderId = HeaderId(0x4c);
    pub const AUTH_CHALLENGE: HeaderId = HeaderId(0x4d);
    pub const AUTH_RESPONSE: HeaderId = HeaderId(0x4e);
    pub const OBJECT_CLASS: HeaderId = HeaderId(0x4f);

    pub fn encoding(self) -> HeaderEncoding {
        match self.0 & 0xc0 {
            0x00 => HeaderEncoding::Unicode,
            0x40 => HeaderEncoding::Bytes,
            0x80 => HeaderEncoding::Byte,
            _ => HeaderEncoding::FourByte,
        }
    }

    pub fn is_body(self) -> bool {
        self == HeaderId::BODY || self == HeaderId::END_OF_BODY
    }
}

impl fmt::Display for HeaderId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "0x{:02x}", self.0)
    }
}
