//! Conversion between a collection and its on-disk text.
//!
//! The shipped codec is pretty-printed JSON: readable, hand-editable, and
//! tolerant of added optional fields (unknown keys are ignored, missing ones
//! take their serde defaults).

use crate::error::{LogbookError, Result};
use crate::model::Record;

pub trait Codec<R: Record> {
    /// File extension, without the dot.
    fn extension(&self) -> &'static str;

    /// Empty or whitespace-only input is an empty collection, not an error.
    fn decode(&self, bytes: &[u8]) -> Result<Vec<R>>;

    /// Must be deterministic: equal collections encode to equal bytes.
    fn encode(&self, records: &[R]) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<R: Record> Codec<R> for JsonCodec {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<R>> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(bytes).map_err(|e| LogbookError::Decode {
            collection: R::COLLECTION,
            reason: e.to_string(),
            line: e.line(),
            column: e.column(),
        })
    }

    fn encode(&self, records: &[R]) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(records).map_err(LogbookError::Serialization)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
