//! Client side of OBEX operations.
//!
//! `obex-client` drives one GET or PUT over an already connected OBEX session: it exchanges
//! request and response packets, accumulates the response headers, streams the body and
//! handles abort and close. Packet framing and the header wire format are supplied by the
//! caller through [`session::Transport`] and [`session::HeaderCodec`].
//!
//! An operation is owned by one thread. Every exchange blocks that thread until the response
//! arrives. [`ops::AbortHandle`] is the only part of an operation meant to be used from
//! another thread.

#![forbid(unsafe_code)]

pub use self::error::{ObexError, ObexResult};
pub use self::headers::{HeaderSet, HeaderValue};
pub use self::ops::{AbortHandle, ClientOperation, Get, Put};
pub use self::proto::{HeaderId, Opcode, ResponseCode};
pub use self::session::{Config, HeaderCodec, Session, Transport};

pub mod error;
pub mod headers;
pub mod io;
pub mod ops;
pub mod proto;
pub mod session;

mod util;

/// A kind of client operation.
pub trait Operation: sealed::Sealed + Sized {
    const OPCODE: proto::Opcode;
    const HAS_OUTPUT: bool;

    /// Ends caller access to the body streams. Reading the response code implies this.
    fn close_stream(streams: &io::Streams);
}

mod sealed {
    pub trait Sealed {}
}
