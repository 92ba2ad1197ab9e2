//! Progress events emitted by a [`JobSession`](crate::session::JobSession).
//!
//! Every event is stamped with the generation of the run that produced
//! it, so that a consumer only ever acts on the currently active job.

use chrono::{DateTime, Utc};
use coderun_core::execution::JobOutcome;
use coderun_core::types::JobToken;

use crate::client::JobError;

/// What happened to a session's job.
#[derive(Debug)]
pub enum JobEventKind {
    /// The service accepted the job.
    Submitted { token: JobToken },

    /// A status query returned a status (terminal or not).
    Polled {
        token: JobToken,
        attempt: u32,
        /// Lifecycle label, e.g. `"queued"` or `"running"`.
        status: &'static str,
    },

    /// The job reached a terminal status. Failed runs land here too.
    Completed { token: JobToken, outcome: JobOutcome },

    /// The client gave up: submission, polling, decoding or time budget.
    Errored(JobError),
}

impl JobEventKind {
    /// Whether no further event follows for the same run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Errored(_))
    }
}

/// A session event with its run generation.
#[derive(Debug)]
pub struct JobEvent {
    pub generation: u64,
    pub kind: JobEventKind,
    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl JobEvent {
    pub fn new(generation: u64, kind: JobEventKind) -> Self {
        Self {
            generation,
            kind,
            timestamp: Utc::now(),
        }
    }
}
