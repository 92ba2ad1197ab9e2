use std::fmt;

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Execution-environment identifier understood by the remote service
/// (e.g. `54` for C++ GCC 9.2.0).
pub type LanguageId = u32;

/// Opaque job handle issued by the execution service on submission.
///
/// The service owns uniqueness and expiry; the client only uses the
/// token as the key for status queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobToken(String);

impl JobToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single "run this code" request.
///
/// Built once per user action via [`ExecutionRequest::new`] (optionally
/// followed by [`with_stdin`](ExecutionRequest::with_stdin)) and never
/// mutated after it is handed to the client. Source and stdin are
/// arbitrary bytes; they are base64-encoded for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    language_id: LanguageId,
    source_code: Vec<u8>,
    stdin: Vec<u8>,
}

impl ExecutionRequest {
    /// Create a request for a catalogued language with empty stdin.
    pub fn new(language: &Language, source_code: impl Into<Vec<u8>>) -> Self {
        Self::with_language_id(language.id, source_code)
    }

    /// Create a request for a raw language id.
    ///
    /// The id is still checked against the catalogue at submission time.
    pub fn with_language_id(language_id: LanguageId, source_code: impl Into<Vec<u8>>) -> Self {
        Self {
            language_id,
            source_code: source_code.into(),
            stdin: Vec::new(),
        }
    }

    /// Attach custom program input.
    pub fn with_stdin(mut self, stdin: impl Into<Vec<u8>>) -> Self {
        self.stdin = stdin.into();
        self
    }

    pub fn language_id(&self) -> LanguageId {
        self.language_id
    }

    pub fn source_code(&self) -> &[u8] {
        &self.source_code
    }

    pub fn stdin(&self) -> &[u8] {
        &self.stdin
    }
}
