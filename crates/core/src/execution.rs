//! Job status lifecycle and the decoded outcome of a remote run.
//!
//! A job moves forward only: `Queued -> Running -> {Finished | Failed}`
//! (the service may skip `Running`). Both terminal variants carry the
//! full [`ExecutionResult`] so that callers can render compile output
//! or stderr for failed runs too.

use std::borrow::Cow;

use crate::status::{self, STATUS_ACCEPTED, STATUS_IN_QUEUE, STATUS_PROCESSING};

/// Decoded output of a job as reported by the service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    /// Raw status id reported by the service.
    pub status_id: i32,
    /// Status label, e.g. `"Accepted"` or `"Compilation Error"`.
    pub status_description: String,
    pub stdout: Option<Vec<u8>>,
    pub stderr: Option<Vec<u8>>,
    pub compile_output: Option<Vec<u8>>,
    /// Service diagnostic (e.g. "Exited with error status 1").
    pub message: Option<Vec<u8>>,
    pub exit_code: Option<i32>,
    pub exit_signal: Option<i32>,
    /// CPU time in seconds.
    pub time_secs: Option<f64>,
    /// Peak memory in kilobytes.
    pub memory_kb: Option<u64>,
}

impl ExecutionResult {
    pub fn stdout_text(&self) -> Option<Cow<'_, str>> {
        self.stdout.as_deref().map(String::from_utf8_lossy)
    }

    pub fn stderr_text(&self) -> Option<Cow<'_, str>> {
        self.stderr.as_deref().map(String::from_utf8_lossy)
    }

    pub fn compile_output_text(&self) -> Option<Cow<'_, str>> {
        self.compile_output.as_deref().map(String::from_utf8_lossy)
    }

    pub fn message_text(&self) -> Option<Cow<'_, str>> {
        self.message.as_deref().map(String::from_utf8_lossy)
    }
}

/// Why a completed job is reported as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionErrorKind {
    WrongAnswer,
    TimeLimitExceeded,
    CompilationError,
    /// Program crashed; `signal` is the service's label (e.g. `"SIGSEGV"`).
    RuntimeError { signal: &'static str },
    InternalError,
    ExecFormatError,
    /// Terminal status id this client does not recognise.
    Unknown,
}

impl ExecutionErrorKind {
    pub fn from_status_id(status_id: i32) -> Self {
        if let Some(signal) = status::runtime_error_label(status_id) {
            return Self::RuntimeError { signal };
        }
        match status_id {
            status::STATUS_WRONG_ANSWER => Self::WrongAnswer,
            status::STATUS_TIME_LIMIT_EXCEEDED => Self::TimeLimitExceeded,
            status::STATUS_COMPILATION_ERROR => Self::CompilationError,
            status::STATUS_INTERNAL_ERROR => Self::InternalError,
            status::STATUS_EXEC_FORMAT_ERROR => Self::ExecFormatError,
            _ => Self::Unknown,
        }
    }
}

/// A job the service completed but reported as unsuccessful.
///
/// This is a normal terminal outcome, not a client fault.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} (status {})", .result.status_description, .result.status_id)]
pub struct ExecutionError {
    pub kind: ExecutionErrorKind,
    pub result: ExecutionResult,
}

impl ExecutionError {
    pub fn new(result: ExecutionResult) -> Self {
        Self {
            kind: ExecutionErrorKind::from_status_id(result.status_id),
            result,
        }
    }

    /// Raw status id, preserved for codes the client does not know.
    pub fn status_id(&self) -> i32 {
        self.result.status_id
    }
}

/// State of a job as observed by one status query.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Queued,
    Running,
    Finished(ExecutionResult),
    Failed(ExecutionError),
}

impl JobStatus {
    /// Classify a decoded service response by its status id.
    pub fn from_result(result: ExecutionResult) -> Self {
        match result.status_id {
            STATUS_IN_QUEUE => Self::Queued,
            STATUS_PROCESSING => Self::Running,
            STATUS_ACCEPTED => Self::Finished(result),
            _ => Self::Failed(ExecutionError::new(result)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_) | Self::Failed(_))
    }

    /// Position in the forward-only lifecycle.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::Running => 1,
            Self::Finished(_) | Self::Failed(_) => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Finished(_) => "finished",
            Self::Failed(_) => "failed",
        }
    }

    /// Terminal statuses become an outcome; pending ones return `None`.
    pub fn into_outcome(self) -> Option<JobOutcome> {
        match self {
            Self::Finished(result) => Some(JobOutcome::Finished(result)),
            Self::Failed(error) => Some(JobOutcome::Failed(error)),
            Self::Queued | Self::Running => None,
        }
    }
}

/// Terminal outcome delivered to the caller of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Finished(ExecutionResult),
    Failed(ExecutionError),
}

impl JobOutcome {
    pub fn result(&self) -> &ExecutionResult {
        match self {
            Self::Finished(result) => result,
            Self::Failed(error) => &error.result,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}
