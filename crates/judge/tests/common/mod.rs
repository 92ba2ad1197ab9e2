#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use coderun_core::types::JobToken;
use coderun_judge::api::{JobApi, JudgeApiError};
use coderun_judge::wire::{SubmissionDetails, SubmissionRequest};
use tokio::time::Instant;

/// One scripted answer of the status endpoint.
#[derive(Debug, Clone)]
pub enum Step {
    /// Respond with this status id and description.
    Status(i32, &'static str),
    /// Respond with a fully specified body.
    Details(SubmissionDetails),
    /// Fail with this HTTP status.
    HttpError(u16),
    /// Fail at the transport level.
    Disconnect,
}

impl Step {
    fn respond(&self) -> Result<SubmissionDetails, JudgeApiError> {
        match self {
            Self::Status(id, description) => Ok(SubmissionDetails::with_status(*id, *description)),
            Self::Details(details) => Ok(details.clone()),
            Self::HttpError(status) => Err(JudgeApiError::ApiError {
                status: *status,
                body: "scripted failure".into(),
            }),
            Self::Disconnect => Err(JudgeApiError::Transport("connection reset".into())),
        }
    }
}

pub fn queued() -> Step {
    Step::Status(1, "In Queue")
}

pub fn running() -> Step {
    Step::Status(2, "Processing")
}

/// Accepted with the given stdout.
pub fn accepted(stdout: &str) -> Step {
    Step::Details(SubmissionDetails {
        stdout: Some(coderun_core::encoding::encode(stdout.as_bytes())),
        time: Some("0.004".into()),
        memory: Some(3200),
        exit_code: Some(0),
        ..SubmissionDetails::with_status(3, "Accepted")
    })
}

/// In-memory [`JobApi`] replaying a fixed status script.
///
/// The last step repeats once the script is exhausted. Every status
/// call is timestamped on Tokio's clock.
pub struct ScriptedApi {
    token: &'static str,
    submit_failure: Option<u16>,
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub submitted: Mutex<Vec<SubmissionRequest>>,
    pub status_times: Mutex<Vec<Instant>>,
    /// Simulated latency of each call.
    latency: Duration,
}

impl ScriptedApi {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            token: "job-1",
            submit_failure: None,
            steps: Mutex::new(steps.into_iter().collect()),
            last: Mutex::new(None),
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
            status_times: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
        }
    }

    pub fn with_token(mut self, token: &'static str) -> Self {
        self.token = token;
        self
    }

    pub fn failing_submit(mut self, status: u16) -> Self {
        self.submit_failure = Some(status);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn submits(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Gaps between consecutive status calls.
    pub fn poll_gaps(&self) -> Vec<Duration> {
        let times = self.status_times.lock().unwrap();
        times.windows(2).map(|w| w[1] - w[0]).collect()
    }

    fn next_step(&self) -> Step {
        let mut steps = self.steps.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(step) = steps.pop_front() {
            *last = Some(step.clone());
            return step;
        }
        last.clone().unwrap_or_else(queued)
    }
}

#[async_trait]
impl JobApi for ScriptedApi {
    async fn submit(&self, request: &SubmissionRequest) -> Result<JobToken, JudgeApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(request.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.submit_failure {
            Some(status) => Err(JudgeApiError::ApiError {
                status,
                body: "submission rejected".into(),
            }),
            None => Ok(JobToken::new(self.token)),
        }
    }

    async fn status(&self, _token: &JobToken) -> Result<SubmissionDetails, JudgeApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status_times.lock().unwrap().push(Instant::now());
        let step = self.next_step();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        step.respond()
    }
}
