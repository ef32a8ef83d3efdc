use bytes::Bytes;
use smallvec::SmallVec;

use crate::{
    proto::{HeaderEncoding, HeaderId, ResponseCode},
    ObexError, ObexResult,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderValue {
    Text(String),
    Bytes(Bytes),
    Byte(u8),
    FourByte(u32),
}

/// Where a header set came from. Only sets built locally may be sent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    Created,
    Received,
}

/// Ordered mapping of header ids to values, plus the response code for received sets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderSet {
    origin: Origin,
    response_code: Option<ResponseCode>,
    entries: SmallVec<[(HeaderId, HeaderValue); 8]>,
}

impl HeaderValue {
    pub fn encoding(&self) -> HeaderEncoding {
        match self {
            HeaderValue::Text(_) => HeaderEncoding::Unicode,
            HeaderValue::Bytes(_) => HeaderEncoding::Bytes,
            HeaderValue::Byte(_) => HeaderEncoding::Byte,
            HeaderValue::FourByte(_) => HeaderEncoding::FourByte,
        }
    }
}

impl Default for HeaderSet {
    fn default() -> Self {
        HeaderSet::new()
    }
}

impl HeaderSet {
    pub fn new() -> Self {
        HeaderSet {
            origin: Origin::Created,
            response_code: None,
            entries: SmallVec::new(),
        }
    }

    pub fn received(code: ResponseCode) -> Self {
        HeaderSet {
            origin: Origin::Received,
            response_code: Some(code),
            entries: SmallVec::new(),
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn response_code(&self) -> Option<ResponseCode> {
        self.response_code
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HeaderId, &HeaderValue)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }

    /// Sets or replaces a header. Replacing keeps the original position.
    pub fn set(&mut self, id: HeaderId, value: HeaderValue) -> ObexResult<()> {
        if id.encoding() != value.encoding() {
            return Err(ObexError::HeaderType(id));
        }

        match self.entries.iter_mut().find(|(entry, _)| *entry == id) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((id, value)),
        }

        Ok(())
    }

    pub fn get(&self, id: HeaderId) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, id: HeaderId) -> bool {
        self.get(id).is_some()
    }

    pub fn text(&self, id: HeaderId) -> ObexResult<Option<&str>> {
        match self.typed(id, HeaderEncoding::Unicode)? {
            Some(HeaderValue::Text(text)) => Ok(Some(text)),
            _ => Ok(None),
        }
    }

    pub fn bytes(&self, id: HeaderId) -> ObexResult<Option<Bytes>> {
        match self.typed(id, HeaderEncoding::Bytes)? {
            Some(HeaderValue::Bytes(bytes)) => Ok(Some(bytes.clone())),
            _ => Ok(None),
        }
    }

    pub fn byte(&self, id: HeaderId) -> ObexResult<Option<u8>> {
        match self.typed(id, HeaderEncoding::Byte)? {
            Some(HeaderValue::Byte(byte)) => Ok(Some(*byte)),
            _ => Ok(None),
        }
    }

    pub fn four_byte(&self, id: HeaderId) -> ObexResult<Option<u32>> {
        match self.typed(id, HeaderEncoding::FourByte)? {
            Some(HeaderValue::FourByte(value)) => Ok(Some(*value)),
            _ => Ok(None),
        }
    }

    /// Copies every entry of `older` that this set does not already carry.
    ///
    /// Body chunks are never carried over: each one is delivered to the reader once, by the
    /// packet that brought it.
    pub fn merge_from(&mut self, older: &HeaderSet) {
        for (id, value) in older.iter() {
            if !id.is_body() && !self.contains(id) {
                self.entries.push((id, value.clone()));
            }
        }
    }

    pub(crate) fn mark_received(&mut self, code: ResponseCode) {
        self.origin = Origin::Received;
        self.response_code = Some(code);
    }

    fn typed(&self, id: HeaderId, expected: HeaderEncoding) -> ObexResult<Option<&HeaderValue>> {
        if id.encoding() != expected {
            return Err(ObexError::HeaderType(id));
        }

        Ok(self.get(id))
    }
}
