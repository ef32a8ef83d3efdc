use std::{marker::PhantomData, sync::Arc};

use crate::{
    headers::HeaderSet,
    io::{InputBuffer, OutputBuffer, Streams},
    proto::{self, HeaderId, ResponseCode},
    session::Session,
    util::{display_opcode, display_or},
    ObexError, ObexResult, Operation,
};

mod abort;
mod body;
mod get;
mod put;
mod state;

pub use abort::AbortHandle;
pub use body::{BodyReader, BodyWriter};
pub use get::Get;
pub use put::Put;

use state::{Lifecycle, Shared};

/// One GET or PUT in progress on a session.
///
/// An operation is meant to be driven by a single thread; use [`AbortHandle`] to cancel it
/// from elsewhere. The FINAL bit is never stored in the opcode: it is derived from whether
/// the request phase has ended when each packet is written.
pub struct ClientOperation<O: Operation> {
    session: Arc<Session>,
    shared: Arc<Shared>,
    input: Arc<InputBuffer>,
    output: Option<Arc<OutputBuffer>>,
    reply_headers: Option<HeaderSet>,
    input_opened: bool,
    output_opened: bool,
    _phantom: PhantomData<O>,
}

impl<O: Operation> ClientOperation<O> {
    pub fn new(session: Arc<Session>) -> Self {
        let streams = Streams::new(O::HAS_OUTPUT);
        let input = Arc::clone(streams.input());
        let output = streams.output().cloned();

        ClientOperation {
            session,
            shared: Arc::new(Shared::new(streams)),
            input,
            output,
            reply_headers: None,
            input_opened: false,
            output_opened: false,
            _phantom: PhantomData,
        }
    }

    pub fn start(&mut self, headers: &HeaderSet) -> ObexResult<()> {
        self.session.codec().validate_created(headers)?;
        self.validate_open()?;
        if self.shared.contains(Lifecycle::STARTED) {
            return Err(ObexError::AlreadyStarted);
        }

        let payload = self.session.codec().encode(headers)?;
        self.shared.insert(Lifecycle::STARTED | Lifecycle::IN_PROGRESS);
        self.exchange_packet(Some(&payload))
    }

    /// Sends more request headers. Each call is a full round trip.
    pub fn send_headers(&mut self, headers: &HeaderSet) -> ObexResult<()> {
        self.session.codec().validate_created(headers)?;
        self.validate_open()?;
        if self.shared.contains(Lifecycle::REQUEST_ENDED) {
            return Err(ObexError::RequestEnded);
        }

        let payload = self.session.codec().encode(headers)?;
        self.exchange_packet(Some(&payload))
    }

    /// Tells the peer that no more request headers follow. Does nothing the second time.
    pub fn end_request_phase(&mut self) -> ObexResult<()> {
        if self.shared.contains(Lifecycle::REQUEST_ENDED) {
            return Ok(());
        }

        self.validate_open()?;
        self.check_error()?;

        let payload = match self.final_body() {
            Ok(payload) => payload,
            Err(error) => {
                self.shared.insert(Lifecycle::ERROR_RECEIVED);
                return Err(error);
            }
        };

        self.shared.remove(Lifecycle::IN_PROGRESS);
        self.shared.insert(Lifecycle::REQUEST_ENDED);
        self.exchange_packet(payload.as_deref())
    }

    pub fn abort(&mut self) -> ObexResult<()> {
        self.abort_handle().abort()
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle::new(
            Arc::clone(&self.session),
            Arc::clone(&self.shared),
            O::close_stream,
        )
    }

    pub fn close(&mut self) -> ObexResult<()> {
        let result = if self.shared.contains(Lifecycle::CLOSED) {
            Ok(())
        } else {
            self.end_request_phase()
        };

        self.close_stream();
        if !self.shared.contains(Lifecycle::CLOSED) {
            self.shared.insert(Lifecycle::CLOSED);
            log::debug!("Client operation closed");
        }

        result
    }

    /// Response headers of every packet so far, newest values first. Ends the request phase.
    pub fn received_headers(&mut self) -> ObexResult<HeaderSet> {
        self.validate_open()?;
        self.end_request_phase()?;
        self.reply_headers.clone().ok_or(ObexError::NoResponse)
    }

    /// Final response code. Ends the request phase and caller access to the body streams.
    ///
    /// An error status answering the final request packet is reported here, not as an
    /// error of the call that sent that packet.
    pub fn response_code(&mut self) -> ObexResult<ResponseCode> {
        self.validate_open()?;
        self.end_request_phase()?;
        self.close_stream();

        self.reply_headers
            .as_ref()
            .and_then(HeaderSet::response_code)
            .ok_or(ObexError::NoResponse)
    }

    pub fn length(&self) -> Option<u64> {
        let length = self
            .reply_headers
            .as_ref()?
            .four_byte(HeaderId::LENGTH)
            .ok()??;

        Some(u64::from(length))
    }

    pub fn content_type(&self) -> Option<String> {
        let value = self.reply_headers.as_ref()?.bytes(HeaderId::TYPE).ok()??;
        let value = value.strip_suffix(b"\0").unwrap_or(&value[..]);
        String::from_utf8(value.to_vec()).ok()
    }

    pub fn encoding(&self) -> Option<&str> {
        None
    }

    pub fn is_closed(&self) -> bool {
        self.shared
            .flags()
            .intersects(Lifecycle::CLOSED | Lifecycle::ERROR_RECEIVED)
    }

    pub fn is_in_progress(&self) -> bool {
        self.shared.contains(Lifecycle::IN_PROGRESS)
    }

    pub fn is_request_ended(&self) -> bool {
        self.shared.contains(Lifecycle::REQUEST_ENDED)
    }

    pub fn is_error_received(&self) -> bool {
        self.shared.contains(Lifecycle::ERROR_RECEIVED)
    }

    pub fn is_final_body_received(&self) -> bool {
        self.shared.contains(Lifecycle::FINAL_BODY_RECEIVED)
    }

    pub fn input_stream(&mut self) -> ObexResult<BodyReader<'_, O>> {
        self.validate_open()?;
        if self.input_opened {
            return Err(ObexError::StreamOpened);
        }

        self.input_opened = true;
        Ok(BodyReader::new(self))
    }

    /// The buffer behind [`Self::input_stream`], for reading on a thread that does not own
    /// the operation. Reads from it block until the owner receives more body data.
    pub fn input_buffer(&self) -> Arc<InputBuffer> {
        Arc::clone(&self.input)
    }

    /// Fetches more response body on behalf of a starving reader.
    fn receive_data(&mut self) -> ObexResult<()> {
        self.validate_open()?;
        self.check_error()?;

        if self.shared.contains(Lifecycle::REQUEST_ENDED) {
            self.exchange_packet(None)
        } else {
            self.end_request_phase()
        }
    }

    fn exchange_packet(&mut self, payload: Option<&[u8]>) -> ObexResult<()> {
        self.validate_open()?;

        let opcode = O::OPCODE.with_final(self.shared.contains(Lifecycle::REQUEST_ENDED));
        let result = self.try_exchange(opcode, payload);
        if result.is_err() {
            self.shared.insert(Lifecycle::ERROR_RECEIVED);
        }

        result
    }

    fn try_exchange(&mut self, opcode: u8, payload: Option<&[u8]>) -> ObexResult<()> {
        let received = self.session.exchange(opcode, payload)?;
        let code = received.response_code().ok_or(ObexError::NoResponse)?;

        log::debug!(
            "Client operation {} got reply {}",
            display_opcode(opcode),
            code
        );

        match code {
            ResponseCode::Success => {
                self.process_incoming_headers(received);
                self.process_incoming_data(true)?;
                self.shared.remove(Lifecycle::IN_PROGRESS);
            }

            ResponseCode::Continue => {
                self.process_incoming_headers(received);
                self.process_incoming_data(false)?;
            }

            code => {
                self.shared.insert(Lifecycle::ERROR_RECEIVED);
                self.process_incoming_headers(received);

                if !proto::is_final(opcode) {
                    return Err(ObexError::Response(code));
                }

                // Reported through response_code()
                log::debug!("Final packet answered with {}", code);
            }
        }

        Ok(())
    }

    fn process_incoming_headers(&mut self, mut received: HeaderSet) {
        if let Some(previous) = self.reply_headers.take() {
            received.merge_from(&previous);
        }

        self.reply_headers = Some(received);
    }

    fn process_incoming_data(&self, mut eof: bool) -> ObexResult<()> {
        let headers = match &self.reply_headers {
            Some(headers) => headers,
            None => return Ok(()),
        };

        let mut data = headers.bytes(HeaderId::BODY)?;
        if data.is_none() {
            data = headers.bytes(HeaderId::END_OF_BODY)?;
            if data.is_some() {
                self.shared.insert(Lifecycle::FINAL_BODY_RECEIVED);
                eof = true;
            }
        }

        match data {
            Some(data) => {
                log::trace!(
                    "Client received {} body bytes (eof: {}, length: {})",
                    data.len(),
                    eof,
                    display_or(self.length(), "unknown")
                );

                self.input.append(Some(data), eof);
            }

            None if eof => self.input.append(None, true),
            None => (),
        }

        Ok(())
    }

    fn final_body(&self) -> ObexResult<Option<bytes::Bytes>> {
        match &self.output {
            Some(output) if self.output_opened => {
                let remaining = output.take(usize::MAX);
                put::encode_body(&self.session, HeaderId::END_OF_BODY, remaining).map(Some)
            }

            _ => Ok(None),
        }
    }

    fn close_stream(&self) {
        O::close_stream(&self.shared.streams());
    }

    /// Once an exchange has failed, no further packets are sent.
    fn check_error(&self) -> ObexResult<()> {
        if !self.shared.contains(Lifecycle::ERROR_RECEIVED) {
            return Ok(());
        }

        let code = self.reply_headers.as_ref().and_then(HeaderSet::response_code);
        Err(match code {
            Some(code) if code.is_error() => ObexError::Response(code),
            _ => ObexError::Closed,
        })
    }

    fn validate_open(&self) -> ObexResult<()> {
        if self.shared.contains(Lifecycle::CLOSED) {
            Err(ObexError::Closed)
        } else {
            Ok(())
        }
    }
}
