//! Binary-safe transport encoding for program text and output.
//!
//! The execution service exchanges every byte-bearing field as standard
//! base64. Encoded output from the service may be wrapped with line
//! breaks every 60 characters, so decoding ignores ASCII whitespace.

use base64::{prelude::BASE64_STANDARD, Engine};

use crate::error::CoreError;

/// Encode arbitrary bytes as unwrapped standard base64.
pub fn encode(bytes: &[u8]) -> String {
    BASE64_STANDARD.encode(bytes)
}

/// Decode a base64 field, tolerating embedded line breaks.
///
/// `field` names the wire field for the error message.
pub fn decode(field: &'static str, encoded: &str) -> Result<Vec<u8>, CoreError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    BASE64_STANDARD
        .decode(compact)
        .map_err(|e| CoreError::Decode {
            field,
            reason: e.to_string(),
        })
}

/// Decode an optional field; `None` stays `None`.
pub fn decode_optional(
    field: &'static str,
    encoded: Option<&str>,
) -> Result<Option<Vec<u8>>, CoreError> {
    encoded.map(|value| decode(field, value)).transpose()
}
