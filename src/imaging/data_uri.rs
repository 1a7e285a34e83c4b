//! `data:<mime>;base64,<payload>` strings.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;

/// Encode bytes as a base64 `data:` URI.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64_STANDARD.encode(bytes))
}

/// A borrowed view of a base64 `data:` URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub mime: &'a str,
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// Split a `data:<mime>;base64,<payload>` string.
    ///
    /// Returns `None` for anything else, including non-base64 data URIs and
    /// empty MIME types or payloads.
    pub fn parse(uri: &'a str) -> Option<Self> {
        let rest = uri.strip_prefix("data:")?;
        let (mime, payload) = rest.split_once(";base64,")?;
        if mime.is_empty() || payload.is_empty() || mime.contains(',') {
            return None;
        }
        Some(Self { mime, payload })
    }

    /// Decode the payload bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64_STANDARD.decode(self.payload)
    }

    /// Size of the decoded payload without decoding it.
    pub fn decoded_len(&self) -> usize {
        let padding = self.payload.bytes().rev().take_while(|&b| b == b'=').count();
        ((self.payload.len() / 4) * 3).saturating_sub(padding.min(2))
    }
}
