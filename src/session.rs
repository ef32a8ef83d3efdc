use std::{io, sync::Arc};

use bytes::Bytes;

use crate::{
    headers::{HeaderSet, Origin},
    ops::{ClientOperation, Get, Put},
    proto::{ResponseCode, RESPONSE_PREFIX},
    ObexError, ObexResult, Operation,
};

/// Packet-level access to an established OBEX connection.
///
/// Both calls block. `read_operation` returns one whole response packet, including its
/// three-byte prefix. Implementations must tolerate an abort packet being written from a
/// second thread.
pub trait Transport: Send + Sync {
    fn write_operation(&self, opcode: u8, payload: Option<&[u8]>) -> io::Result<()>;
    fn read_operation(&self) -> io::Result<Bytes>;
}

/// Wire representation of header sets.
pub trait HeaderCodec: Send + Sync {
    fn encode(&self, headers: &HeaderSet) -> ObexResult<Bytes>;

    /// Parses the headers of `packet` starting at `offset`.
    fn decode(&self, code: ResponseCode, packet: &[u8], offset: usize) -> ObexResult<HeaderSet>;

    fn validate_created(&self, headers: &HeaderSet) -> ObexResult<()> {
        match headers.origin() {
            Origin::Created => Ok(()),
            Origin::Received => Err(ObexError::ForeignHeaders),
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Config {
    pub max_body_chunk: usize,
}

pub struct Session {
    transport: Box<dyn Transport>,
    codec: Box<dyn HeaderCodec>,
    config: Config,
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn write_operation(&self, opcode: u8, payload: Option<&[u8]>) -> io::Result<()> {
        (**self).write_operation(opcode, payload)
    }

    fn read_operation(&self) -> io::Result<Bytes> {
        (**self).read_operation()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_body_chunk: DEFAULT_BODY_CHUNK,
        }
    }
}

impl Session {
    pub fn new(transport: impl Transport + 'static, codec: impl HeaderCodec + 'static) -> Self {
        Session::with_config(transport, codec, Config::default())
    }

    pub fn with_config(
        transport: impl Transport + 'static,
        codec: impl HeaderCodec + 'static,
        config: Config,
    ) -> Self {
        Session {
            transport: Box::new(transport),
            codec: Box::new(codec),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn codec(&self) -> &dyn HeaderCodec {
        &*self.codec
    }

    pub fn get(self: &Arc<Self>, headers: &HeaderSet) -> ObexResult<ClientOperation<Get>> {
        self.start(headers)
    }

    pub fn put(self: &Arc<Self>, headers: &HeaderSet) -> ObexResult<ClientOperation<Put>> {
        self.start(headers)
    }

    pub(crate) fn exchange(&self, opcode: u8, payload: Option<&[u8]>) -> ObexResult<HeaderSet> {
        self.transport.write_operation(opcode, payload)?;
        let packet = self.transport.read_operation()?;
        self.decode_response(&packet)
    }

    fn start<O: Operation>(
        self: &Arc<Self>,
        headers: &HeaderSet,
    ) -> ObexResult<ClientOperation<O>> {
        let mut operation = ClientOperation::new(Arc::clone(self));
        operation.start(headers)?;
        Ok(operation)
    }

    fn decode_response(&self, packet: &[u8]) -> ObexResult<HeaderSet> {
        if packet.len() < RESPONSE_PREFIX {
            return Err(ObexError::Malformed("response packet truncated"));
        }

        let code = ResponseCode::try_from(packet[0])
            .map_err(|_| ObexError::UnknownResponse(packet[0]))?;

        let mut headers = self.codec.decode(code, packet, RESPONSE_PREFIX)?;
        headers.mark_received(code);
        Ok(headers)
    }
}

const DEFAULT_BODY_CHUNK: usize = 4096;
