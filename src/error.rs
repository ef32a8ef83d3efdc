use std::io;

use quick_error::quick_error;

use crate::proto::{HeaderId, ResponseCode};

quick_error! {
    #[derive(Debug)]
    pub enum ObexError {
        Io(err: io::Error) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
        Malformed(reason: &'static str) { display("malformed response: {}", reason) }
        UnknownResponse(code: u8) { display("unknown response code 0x{:02x}", code) }
        Response(code: ResponseCode) { display("operation error, {}", code) }
        AbortRejected(code: ResponseCode) { display("failed to abort operation, {}", code) }
        Closed { display("operation closed") }
        NotInProgress { display("the transaction has already ended") }
        AlreadyStarted { display("operation already started") }
        RequestEnded { display("the request phase has already ended") }
        ForeignHeaders { display("header set was not created for sending") }
        HeaderType(id: HeaderId) { display("value does not match the encoding of header {}", id) }
        StreamOpened { display("stream already opened") }
        NoResponse { display("no response received yet") }
    }
}

pub type ObexResult<T> = Result<T, ObexError>;

impl From<ObexError> for io::Error {
    fn from(error: ObexError) -> Self {
        match error {
            ObexError::Io(error) => error,
            ObexError::Closed => io::Error::new(io::ErrorKind::NotConnected, error),
            error => io::Error::new(io::ErrorKind::Other, error),
        }
    }
}
