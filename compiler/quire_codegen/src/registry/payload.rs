//! Declaration payload blobs.
//!
//! Payloads are stored either verbatim or brotli-compressed; readers always
//! see the decompressed bytes.

use std::borrow::Cow;
use std::io::{Read, Write};

const BUFFER_SIZE: usize = 4096;
const QUALITY: u32 = 9;
const WINDOW: u32 = 22;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclarationPayload {
    bytes: Vec<u8>,
    compressed: bool,
}

impl DeclarationPayload {
    /// Wrap bytes as given. `compressed` marks brotli-compressed input.
    pub fn new(bytes: Vec<u8>, compressed: bool) -> Self {
        DeclarationPayload { bytes, compressed }
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Stored bytes, before any decompression.
    pub fn raw(&self) -> &[u8] {
        &self.bytes
    }

    /// Decompressed contents; `None` when a compressed blob is corrupt.
    pub fn contents(&self) -> Option<Cow<'_, [u8]>> {
        if !self.compressed {
            return Some(Cow::Borrowed(&self.bytes));
        }
        let mut out = Vec::new();
        match brotli::Decompressor::new(self.bytes.as_slice(), BUFFER_SIZE).read_to_end(&mut out) {
            Ok(_) => Some(Cow::Owned(out)),
            Err(error) => {
                tracing::warn!(%error, "declaration payload failed to decompress");
                None
            }
        }
    }
}

/// Brotli-compress `bytes` for storage as a payload.
pub fn compress(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut writer = brotli::CompressorWriter::new(&mut out, BUFFER_SIZE, QUALITY, WINDOW);
        writer.write_all(bytes)?;
        writer.flush()?;
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests {
    use super::*;

    #[test]
    fn test_plain_payload_is_borrowed() {
        let payload = DeclarationPayload::new(b"int f();".to_vec(), false);
        assert!(matches!(payload.contents(), Some(Cow::Borrowed(b"int f();"))));
    }

    #[test]
    fn test_compressed_payload_is_transparent() {
        let text = b"Model::Real f(Model::Real x);\n".repeat(20);
        let payload = DeclarationPayload::new(compress(&text).unwrap(), true);
        assert!(payload.raw().len() < text.len());
        assert_eq!(payload.contents().unwrap().as_ref(), text.as_slice());
    }

    #[test]
    fn test_corrupt_payload_reads_as_absent() {
        let text: Vec<u8> = (0..4000u32).flat_map(|n| n.to_string().into_bytes()).collect();
        let mut blob = compress(&text).unwrap();
        blob.truncate(blob.len() / 2);
        let payload = DeclarationPayload::new(blob, true);
        assert!(payload.contents().is_none());
    }
}
