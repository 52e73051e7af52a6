//! Stream codec boundary.
//!
//! The game stores the object stream and the layout stream compressed. The
//! container parser only ever sees decoded bytes, so the compression scheme
//! is supplied from outside through [`StreamCodec`].

use crate::error::CodecError;

/// Converts between on-disk bytes and decoded container bytes.
pub trait StreamCodec: Send + Sync {
    /// Decodes bytes read from disk.
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Encodes container bytes for writing to disk.
    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Short name used in log output.
    fn name(&self) -> &str;
}

/// Identity codec for uncompressed bundles.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCodec;

impl StreamCodec for PassthroughCodec {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(input.to_vec())
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(input.to_vec())
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}
