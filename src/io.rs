use std::{
    collections::VecDeque,
    io,
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
};

use bytes::{Buf, Bytes, BytesMut};

/// Response body received so far, waiting to be read.
#[derive(Default)]
pub struct InputBuffer {
    state: Mutex<InputState>,
    changed: Condvar,
}

/// Request body written by the caller, waiting to be sent.
#[derive(Default)]
pub struct OutputBuffer {
    state: Mutex<OutputState>,
}

/// The buffers of one operation, as seen by its stream-closing hook.
pub struct Streams {
    input: Arc<InputBuffer>,
    output: Option<Arc<OutputBuffer>>,
}

#[derive(Default)]
struct InputState {
    chunks: VecDeque<Bytes>,
    eof: bool,
    closed: bool,
}

#[derive(Default)]
struct OutputState {
    pending: BytesMut,
    aborted: bool,
    closed: bool,
}

impl InputBuffer {
    pub fn new() -> Self {
        InputBuffer::default()
    }

    pub fn append(&self, chunk: Option<Bytes>, eof: bool) {
        let mut state = self.lock();
        if state.closed {
            return;
        }

        if state.eof {
            if chunk.map_or(false, |chunk| !chunk.is_empty()) {
                log::warn!("Dropping body data received after end of data");
            }

            return;
        }

        if let Some(chunk) = chunk.filter(|chunk| !chunk.is_empty()) {
            state.chunks.push_back(chunk);
        }

        state.eof = eof;
        drop(state);

        self.changed.notify_all();
    }

    /// Wakes every blocked reader. Reads fail from now on.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.chunks.clear();
        drop(state);

        self.changed.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn is_eof(&self) -> bool {
        self.lock().eof
    }

    /// Blocks until data, end of data, or closure.
    pub fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.lock();
        loop {
            if let Some(read) = state.try_read(buf)? {
                return Ok(read);
            }

            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like `read()`, but `None` instead of blocking.
    pub fn try_read(&self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        self.lock().try_read(buf)
    }

    fn lock(&self) -> MutexGuard<'_, InputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl InputState {
    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::ConnectionAborted, "stream closed"));
        }

        let chunk = match self.chunks.front_mut() {
            Some(chunk) => chunk,
            None if self.eof => return Ok(Some(0)),
            None => return Ok(None),
        };

        let read = chunk.len().min(buf.len());
        buf[..read].copy_from_slice(&chunk[..read]);
        chunk.advance(read);

        if chunk.is_empty() {
            self.chunks.pop_front();
        }

        Ok(Some(read))
    }
}

impl OutputBuffer {
    pub fn new() -> Self {
        OutputBuffer::default()
    }

    pub fn write(&self, data: &[u8]) -> io::Result<()> {
        let mut state = self.lock();
        if state.aborted {
            return Err(io::Error::new(io::ErrorKind::ConnectionAborted, "operation aborted"));
        } else if state.closed {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"));
        }

        state.pending.extend_from_slice(data);
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Removes up to `max` pending bytes, oldest first.
    pub fn take(&self, max: usize) -> Bytes {
        let mut state = self.lock();
        let count = state.pending.len().min(max);
        state.pending.split_to(count).freeze()
    }

    pub fn abort(&self) {
        let mut state = self.lock();
        state.aborted = true;
        state.pending.clear();
    }

    pub fn close(&self) {
        self.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        let state = self.lock();
        state.closed || state.aborted
    }

    fn lock(&self) -> MutexGuard<'_, OutputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Streams {
    pub(crate) fn new(output: bool) -> Self {
        Streams {
            input: Arc::new(InputBuffer::new()),
            output: output.then(|| Arc::new(OutputBuffer::new())),
        }
    }

    pub fn input(&self) -> &Arc<InputBuffer> {
        &self.input
    }

    pub fn output(&self) -> Option<&Arc<OutputBuffer>> {
        self.output.as_ref()
    }
}
