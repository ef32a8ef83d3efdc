#![allow(dead_code)]

use std::{
    collections::VecDeque,
    io,
    sync::{Arc, Mutex},
};

use bytes::{BufMut, Bytes, BytesMut};

use obex_client::{
    proto::HeaderEncoding, Config, HeaderCodec, HeaderId, HeaderSet, HeaderValue, ObexError,
    ObexResult, ResponseCode, Session, Transport,
};

/// Replays canned response packets and records every request packet.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<io::Result<Bytes>>>,
    sent: Mutex<Vec<(u8, Option<Bytes>)>>,
    fail_writes: Mutex<bool>,
}

/// `id, u16 length, value` triples; text is UTF-8 and integers are big-endian.
pub struct TestCodec;

/// Like `TestCodec`, but cannot encode END-OF-BODY.
pub struct NoEndOfBody;

impl ScriptedTransport {
    pub fn respond(&self, code: ResponseCode, headers: &HeaderSet) -> &Self {
        self.push(Ok(packet(u8::from(code), headers)))
    }

    pub fn push(&self, response: io::Result<Bytes>) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    pub fn sent(&self) -> Vec<(u8, Option<Bytes>)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn opcodes(&self) -> Vec<u8> {
        self.sent().into_iter().map(|(opcode, _)| opcode).collect()
    }
}

impl Transport for ScriptedTransport {
    fn write_operation(&self, opcode: u8, payload: Option<&[u8]>) -> io::Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "link lost"));
        }

        let payload = payload.map(Bytes::copy_from_slice);
        self.sent.lock().unwrap().push((opcode, payload));
        Ok(())
    }

    fn read_operation(&self) -> io::Result<Bytes> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted")))
    }
}

impl HeaderCodec for TestCodec {
    fn encode(&self, headers: &HeaderSet) -> ObexResult<Bytes> {
        Ok(encode(headers))
    }

    fn decode(&self, code: ResponseCode, packet: &[u8], offset: usize) -> ObexResult<HeaderSet> {
        let mut headers = HeaderSet::received(code);
        for (id, value) in parse(&packet[offset..])? {
            headers.set(id, value)?;
        }

        Ok(headers)
    }
}

impl HeaderCodec for NoEndOfBody {
    fn encode(&self, headers: &HeaderSet) -> ObexResult<Bytes> {
        if headers.contains(HeaderId::END_OF_BODY) {
            return Err(ObexError::Malformed("cannot encode"));
        }

        TestCodec.encode(headers)
    }

    fn decode(&self, code: ResponseCode, packet: &[u8], offset: usize) -> ObexResult<HeaderSet> {
        TestCodec.decode(code, packet, offset)
    }
}

pub fn session() -> (Arc<ScriptedTransport>, Arc<Session>) {
    session_with(Config::default())
}

pub fn session_with(config: Config) -> (Arc<ScriptedTransport>, Arc<Session>) {
    session_with_codec(TestCodec, config)
}

pub fn session_with_codec(
    codec: impl HeaderCodec + 'static,
    config: Config,
) -> (Arc<ScriptedTransport>, Arc<Session>) {
    let _ = env_logger::builder().is_test(true).try_init();

    let transport = Arc::new(ScriptedTransport::default());
    let session = Session::with_config(Arc::clone(&transport), codec, config);
    (transport, Arc::new(session))
}

pub fn headers(entries: &[(HeaderId, HeaderValue)]) -> HeaderSet {
    let mut headers = HeaderSet::new();
    for (id, value) in entries {
        headers.set(*id, value.clone()).unwrap();
    }

    headers
}

pub fn body(id: HeaderId, data: &'static [u8]) -> (HeaderId, HeaderValue) {
    (id, HeaderValue::Bytes(Bytes::from_static(data)))
}

pub fn packet(code: u8, headers: &HeaderSet) -> Bytes {
    let encoded = encode(headers);

    let mut packet = BytesMut::new();
    packet.put_u8(code);
    packet.put_u16((encoded.len() + 3) as u16);
    packet.extend_from_slice(&encoded);
    packet.freeze()
}

pub fn encode(headers: &HeaderSet) -> Bytes {
    let mut out = BytesMut::new();
    for (id, value) in headers.iter() {
        let value: Vec<u8> = match value {
            HeaderValue::Text(text) => text.as_bytes().to_vec(),
            HeaderValue::Bytes(bytes) => bytes.to_vec(),
            HeaderValue::Byte(byte) => vec![*byte],
            HeaderValue::FourByte(value) => value.to_be_bytes().to_vec(),
        };

        out.put_u8(id.0);
        out.put_u16(value.len() as u16);
        out.extend_from_slice(&value);
    }

    out.freeze()
}

pub fn parse(mut raw: &[u8]) -> ObexResult<Vec<(HeaderId, HeaderValue)>> {
    let mut entries = Vec::new();
    while !raw.is_empty() {
        if raw.len() < 3 {
            return Err(ObexError::Malformed("header truncated"));
        }

        let id = HeaderId(raw[0]);
        let len = u16::from_be_bytes([raw[1], raw[2]]) as usize;
        let value = raw
            .get(3..3 + len)
            .ok_or(ObexError::Malformed("header value truncated"))?;

        let value = match id.encoding() {
            HeaderEncoding::Unicode => HeaderValue::Text(
                String::from_utf8(value.to_vec()).map_err(|_| ObexError::Malformed("bad text"))?,
            ),
            HeaderEncoding::Bytes => HeaderValue::Bytes(Bytes::copy_from_slice(value)),
            HeaderEncoding::Byte => HeaderValue::Byte(
                *value.first().ok_or(ObexError::Malformed("bad byte"))?,
            ),
            HeaderEncoding::FourByte => HeaderValue::FourByte(u32::from_be_bytes(
                value
                    .try_into()
                    .map_err(|_| ObexError::Malformed("bad integer"))?,
            )),
        };

        entries.push((id, value));
        raw = &raw[3 + len..];
    }

    Ok(entries)
}

/// Headers carried by a recorded request packet.
pub fn sent_headers(payload: &Option<Bytes>) -> Vec<(HeaderId, HeaderValue)> {
    payload
        .as_ref()
        .map(|payload| parse(payload).unwrap())
        .unwrap_or_default()
}
