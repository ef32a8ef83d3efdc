use std::io;

use super::{ClientOperation, Put};
use crate::Operation;

/// Response body of an operation, fetching more packets as it is consumed.
pub struct BodyReader<'a, O: Operation> {
    operation: &'a mut ClientOperation<O>,
}

/// Request body of a PUT, sent in chunks of the session's `max_body_chunk`.
pub struct BodyWriter<'a> {
    operation: &'a mut ClientOperation<Put>,
}

impl<'a, O: Operation> BodyReader<'a, O> {
    pub(super) fn new(operation: &'a mut ClientOperation<O>) -> Self {
        BodyReader { operation }
    }
}

impl<O: Operation> io::Read for BodyReader<'_, O> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if let Some(read) = self.operation.input.try_read(buf)? {
                return Ok(read);
            }

            self.operation.receive_data()?;
        }
    }
}

impl<'a> BodyWriter<'a> {
    pub(super) fn new(operation: &'a mut ClientOperation<Put>) -> Self {
        BodyWriter { operation }
    }
}

impl io::Write for BodyWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.operation.write_body(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.operation.flush_body()?;
        Ok(())
    }
}
