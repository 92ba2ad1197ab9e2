//! JSON bodies exchanged with the execution service.
//!
//! All byte-bearing fields travel base64-encoded (the client always asks
//! for `base64_encoded=true`). [`SubmissionDetails::decode`] turns a
//! status response into a plain [`ExecutionResult`].

use coderun_core::encoding;
use coderun_core::error::CoreError;
use coderun_core::execution::ExecutionResult;
use coderun_core::types::{ExecutionRequest, LanguageId};
use serde::{Deserialize, Deserializer, Serialize};

/// Status id used when a response carries no `status` object.
pub const MISSING_STATUS_ID: i32 = 0;

/// Body of `POST /submissions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub language_id: LanguageId,
    /// Base64-encoded program text.
    pub source_code: String,
    /// Base64-encoded program input.
    pub stdin: String,
}

impl From<&ExecutionRequest> for SubmissionRequest {
    fn from(request: &ExecutionRequest) -> Self {
        Self {
            language_id: request.language_id(),
            source_code: encoding::encode(request.source_code()),
            stdin: encoding::encode(request.stdin()),
        }
    }
}

/// Response of `POST /submissions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Service-assigned job token.
    pub token: String,
}

/// Status object embedded in a submission response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub id: i32,
    pub description: String,
}

/// Response of `GET /submissions/{token}` with `fields=*`.
///
/// Unknown fields (e.g. `source_code`, `language_id`, `created_at`) are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDetails {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub status: Option<StatusInfo>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub exit_signal: Option<i32>,
    /// CPU time in seconds. The service sends a string such as `"0.002"`.
    #[serde(default, deserialize_with = "string_or_number")]
    pub time: Option<String>,
    /// Peak memory in kilobytes.
    #[serde(default)]
    pub memory: Option<u64>,
}

impl SubmissionDetails {
    /// Convenience constructor for a bare status response.
    pub fn with_status(id: i32, description: impl Into<String>) -> Self {
        Self {
            status: Some(StatusInfo {
                id,
                description: description.into(),
            }),
            ..Default::default()
        }
    }

    pub fn status_id(&self) -> i32 {
        self.status.as_ref().map_or(MISSING_STATUS_ID, |s| s.id)
    }

    /// Decode every base64 field into an [`ExecutionResult`].
    ///
    /// A response without a `status` object decodes with status id
    /// [`MISSING_STATUS_ID`], which classifies as an unknown terminal
    /// failure.
    pub fn decode(&self) -> Result<ExecutionResult, CoreError> {
        let (status_id, status_description) = match &self.status {
            Some(status) => (status.id, status.description.clone()),
            None => (MISSING_STATUS_ID, "Unknown".to_string()),
        };

        Ok(ExecutionResult {
            status_id,
            status_description,
            stdout: encoding::decode_optional("stdout", self.stdout.as_deref())?,
            stderr: encoding::decode_optional("stderr", self.stderr.as_deref())?,
            compile_output: encoding::decode_optional(
                "compile_output",
                self.compile_output.as_deref(),
            )?,
            message: encoding::decode_optional("message", self.message.as_deref())?,
            exit_code: self.exit_code,
            exit_signal: self.exit_signal,
            time_secs: self.time.as_deref().and_then(parse_time),
            memory_kb: self.memory,
        })
    }
}

/// Parse the `time` field, dropping values that are not a number.
fn parse_time(raw: &str) -> Option<f64> {
    match raw.trim().parse() {
        Ok(secs) => Some(secs),
        Err(e) => {
            tracing::warn!(time = raw, error = %e, "Ignoring unparseable execution time");
            None
        }
    }
}

/// Accept `"0.01"`, `0.01`, or `null` for the `time` field.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
