use std::sync::Arc;

use bytes::Bytes;

use super::{state::Lifecycle, BodyWriter, ClientOperation};
use crate::{
    headers::{HeaderSet, HeaderValue},
    io::{OutputBuffer, Streams},
    proto::{HeaderId, Opcode},
    sealed::Sealed,
    session::Session,
    ObexError, ObexResult, Operation,
};

pub enum Put {}

impl Sealed for Put {}

impl Operation for Put {
    const OPCODE: Opcode = Opcode::Put;
    const HAS_OUTPUT: bool = true;

    fn close_stream(streams: &Streams) {
        if let Some(output) = streams.output() {
            output.close();
        }

        streams.input().close();
    }
}

impl ClientOperation<Put> {
    /// Request body. Remaining bytes go out with the final request packet.
    pub fn output_stream(&mut self) -> ObexResult<BodyWriter<'_>> {
        self.validate_open()?;
        if self.shared.contains(Lifecycle::REQUEST_ENDED) {
            return Err(ObexError::RequestEnded);
        } else if self.output_opened {
            return Err(ObexError::StreamOpened);
        }

        self.output_opened = true;
        Ok(BodyWriter::new(self))
    }

    pub(super) fn write_body(&mut self, data: &[u8]) -> ObexResult<()> {
        let output = self.writable_output()?;
        output.write(data)?;

        let chunk = self.chunk_size();
        while output.pending() >= chunk {
            self.deliver_body(&output, chunk)?;
        }

        Ok(())
    }

    pub(super) fn flush_body(&mut self) -> ObexResult<()> {
        let output = self.writable_output()?;

        let chunk = self.chunk_size();
        while output.pending() > 0 {
            self.deliver_body(&output, chunk)?;
        }

        Ok(())
    }

    fn deliver_body(&mut self, output: &OutputBuffer, chunk: usize) -> ObexResult<()> {
        let data = output.take(chunk);
        let payload = encode_body(&self.session, HeaderId::BODY, data)?;
        self.exchange_packet(Some(&payload))
    }

    fn writable_output(&self) -> ObexResult<Arc<OutputBuffer>> {
        self.validate_open()?;
        if self.shared.contains(Lifecycle::REQUEST_ENDED) {
            return Err(ObexError::RequestEnded);
        }

        self.output.clone().ok_or(ObexError::Closed)
    }

    fn chunk_size(&self) -> usize {
        self.session.config().max_body_chunk.max(1)
    }
}

pub(super) fn encode_body(session: &Session, id: HeaderId, data: Bytes) -> ObexResult<Bytes> {
    let mut headers = HeaderSet::new();
    headers.set(id, HeaderValue::Bytes(data))?;
    session.codec().encode(&headers)
}
