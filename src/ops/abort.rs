use std::sync::Arc;

use super::state::{Lifecycle, Shared};
use crate::{
    io::Streams,
    proto::{Opcode, ResponseCode},
    session::Session,
    ObexError, ObexResult,
};

/// Cancels an operation from any thread.
///
/// This is the only way to act on an operation without owning it. Aborting wakes a reader
/// blocked on the operation's input buffer.
#[derive(Clone)]
pub struct AbortHandle {
    session: Arc<Session>,
    shared: Arc<Shared>,
    close_stream: fn(&Streams),
}

struct Finalize<'a>(&'a AbortHandle);

impl AbortHandle {
    pub(crate) fn new(session: Arc<Session>, shared: Arc<Shared>, close_stream: fn(&Streams)) -> Self {
        AbortHandle {
            session,
            shared,
            close_stream,
        }
    }

    /// Only the first of several racing calls sends ABORT; the others fail with `Closed` or
    /// `NotInProgress`.
    pub fn abort(&self) -> ObexResult<()> {
        {
            let streams = self.shared.streams();
            if self.shared.contains(Lifecycle::CLOSED) {
                return Err(ObexError::Closed);
            } else if !self.shared.take(Lifecycle::IN_PROGRESS) {
                return Err(ObexError::NotInProgress);
            }

            if let Some(output) = streams.output() {
                output.abort();
            }

            streams.input().close();
        }

        let _finalize = Finalize(self);
        self.write_abort()
    }

    pub fn is_closed(&self) -> bool {
        self.shared
            .flags()
            .intersects(Lifecycle::CLOSED | Lifecycle::ERROR_RECEIVED)
    }

    fn write_abort(&self) -> ObexResult<()> {
        log::debug!("Sending abort");

        let reply = self.session.exchange(Opcode::Abort.with_final(true), None)?;
        match reply.response_code() {
            Some(ResponseCode::Success) => Ok(()),
            Some(code) => Err(ObexError::AbortRejected(code)),
            None => Err(ObexError::NoResponse),
        }
    }
}

impl Drop for Finalize<'_> {
    fn drop(&mut self) {
        let handle = self.0;
        handle.shared.insert(Lifecycle::CLOSED);
        (handle.close_stream)(&handle.shared.streams());
        log::debug!("Client operation aborted");
    }
}
