use crate::{io::Streams, proto::Opcode, sealed::Sealed, Operation};

pub enum Get {}

impl Sealed for Get {}

impl Operation for Get {
    const OPCODE: Opcode = Opcode::Get;
    const HAS_OUTPUT: bool = false;

    fn close_stream(streams: &Streams) {
        streams.input().close();
    }
}
