//! Submission and bounded status polling for remote jobs.
//!
//! [`RemoteJobClient`] turns an [`ExecutionRequest`] into a terminal
//! [`JobOutcome`]: one submission call, then sequential status queries
//! separated by timer suspensions until the job finishes, a bound in the
//! [`PollPolicy`] is hit, a query fails, or the caller cancels.
//!
//! A job the service reports as failed (compile error, crash, ...) is a
//! normal [`JobOutcome::Failed`], not an `Err`.

use std::sync::Arc;

use coderun_core::execution::{JobOutcome, JobStatus};
use coderun_core::language;
use coderun_core::types::{ExecutionRequest, JobToken, LanguageId};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::api::{JobApi, JudgeApi, JudgeApiError};
use crate::config::JudgeConfig;
use crate::poll::{next_delay, PollPolicy};
use crate::wire::SubmissionRequest;

/// Errors surfaced by the client. None of them is retried by the caller.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The request names a language outside the catalogue.
    #[error("Unsupported language id: {0}")]
    UnsupportedLanguage(LanguageId),

    /// Creating the job failed; no token was allocated.
    #[error("Submission failed: {0}")]
    Submission(#[source] JudgeApiError),

    /// A status query failed after any configured retries.
    #[error("Status query for job {token} failed: {source}")]
    Poll {
        token: JobToken,
        #[source]
        source: JudgeApiError,
    },

    /// The service answered with fields the client could not decode.
    #[error("Job {token} returned a malformed response: {reason}")]
    MalformedResponse { token: JobToken, reason: String },

    /// The poll policy's attempt or time budget ran out.
    #[error("Job {token} did not finish after {attempts} status queries")]
    TimedOut { token: JobToken, attempts: u32 },

    /// The caller cancelled the wait (or the submission).
    #[error("Job cancelled")]
    Cancelled { token: Option<JobToken> },
}

/// Client for one execution-service deployment.
///
/// Cheap to clone; every call keeps its own state, so concurrent
/// submissions and waits never interfere.
pub struct RemoteJobClient<A = JudgeApi> {
    api: Arc<A>,
}

impl<A> Clone for RemoteJobClient<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

impl RemoteJobClient<JudgeApi> {
    /// Build an HTTP-backed client from configuration.
    pub fn from_config(config: &JudgeConfig) -> Result<Self, JudgeApiError> {
        Ok(Self::new(JudgeApi::new(config)?))
    }
}

impl<A: JobApi> RemoteJobClient<A> {
    pub fn new(api: A) -> Self {
        Self::from_shared(Arc::new(api))
    }

    pub fn from_shared(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Submit a request and return the job token.
    ///
    /// Issues exactly one network call (none if the language is not in
    /// the catalogue). Failures are returned immediately, never retried.
    pub async fn submit(&self, request: &ExecutionRequest) -> Result<JobToken, JobError> {
        let language_id = request.language_id();
        if language::find_by_id(language_id).is_none() {
            return Err(JobError::UnsupportedLanguage(language_id));
        }

        let body = SubmissionRequest::from(request);
        match self.api.submit(&body).await {
            Ok(token) => {
                tracing::info!(
                    token = %token,
                    language_id,
                    source_bytes = request.source_code().len(),
                    stdin_bytes = request.stdin().len(),
                    "Job submitted",
                );
                Ok(token)
            }
            Err(e) => {
                tracing::error!(language_id, error = %e, "Job submission failed");
                Err(JobError::Submission(e))
            }
        }
    }

    /// Poll until the job identified by `token` reaches a terminal status.
    pub async fn await_result(
        &self,
        token: &JobToken,
        policy: &PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome, JobError> {
        self.await_result_with(token, policy, cancel, |_, _| {}).await
    }

    /// Like [`await_result`](Self::await_result), calling `observe` with
    /// the attempt number and status after every successful query.
    ///
    /// Queries for the token are strictly sequential. After `cancel`
    /// fires no further query is issued and `observe` is not called
    /// again.
    pub async fn await_result_with<F>(
        &self,
        token: &JobToken,
        policy: &PollPolicy,
        cancel: &CancellationToken,
        mut observe: F,
    ) -> Result<JobOutcome, JobError>
    where
        F: FnMut(u32, &JobStatus) + Send,
    {
        let started = Instant::now();
        let mut interval = policy.interval;
        let mut attempts = 0u32;
        let mut highest_rank = 0u8;

        loop {
            if cancel.is_cancelled() {
                return Err(cancelled(token));
            }

            attempts += 1;
            let status = self
                .query_status(token, policy, started, attempts, cancel)
                .await?;

            tracing::debug!(
                token = %token,
                attempt = attempts,
                status = status.label(),
                "Polled job status",
            );

            if status.rank() < highest_rank {
                tracing::warn!(
                    token = %token,
                    status = status.label(),
                    "Service reported a status older than one already observed",
                );
            }
            highest_rank = highest_rank.max(status.rank());

            observe(attempts, &status);

            if let Some(outcome) = status.into_outcome() {
                tracing::info!(
                    token = %token,
                    attempts,
                    status_id = outcome.result().status_id,
                    success = outcome.is_success(),
                    "Job reached terminal status",
                );
                return Ok(outcome);
            }

            if policy.max_attempts.is_some_and(|max| attempts >= max)
                || policy
                    .deadline
                    .is_some_and(|deadline| started.elapsed() + interval > deadline)
            {
                tracing::warn!(token = %token, attempts, "Gave up waiting for job");
                return Err(JobError::TimedOut {
                    token: token.clone(),
                    attempts,
                });
            }

            // Wait before the next query, respecting cancellation.
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(token)),
                _ = tokio::time::sleep(interval) => {}
            }

            interval = policy.next_interval(interval);
        }
    }

    /// Submit and wait in one call.
    ///
    /// Cancellation is observed during the submission too; a job that
    /// was created before the cancel is simply no longer polled.
    pub async fn run(
        &self,
        request: &ExecutionRequest,
        policy: &PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome, JobError> {
        let token = self.submit_cancellable(request, cancel).await?;
        self.await_result(&token, policy, cancel).await
    }

    /// [`submit`](Self::submit) raced against `cancel`.
    pub async fn submit_cancellable(
        &self,
        request: &ExecutionRequest,
        cancel: &CancellationToken,
    ) -> Result<JobToken, JobError> {
        if cancel.is_cancelled() {
            return Err(JobError::Cancelled { token: None });
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(JobError::Cancelled { token: None }),
            result = self.submit(request) => result,
        }
    }

    // ---- private helpers ----

    /// One logical status query, absorbing transient failures per the
    /// policy's retry settings.
    ///
    /// A retry whose delay would end past `policy.deadline` (measured
    /// from `started`) is not attempted; the wait ends with `TimedOut`.
    async fn query_status(
        &self,
        token: &JobToken,
        policy: &PollPolicy,
        started: Instant,
        attempts: u32,
        cancel: &CancellationToken,
    ) -> Result<JobStatus, JobError> {
        let retry = &policy.retry;
        let mut retries_left = retry.max_retries;
        let mut delay = retry.initial_delay;

        loop {
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(token)),
                response = self.api.status(token) => response,
            };

            match response {
                Ok(details) => {
                    let result = details.decode().map_err(|e| {
                        tracing::error!(token = %token, error = %e, "Undecodable status response");
                        JobError::MalformedResponse {
                            token: token.clone(),
                            reason: e.to_string(),
                        }
                    })?;
                    return Ok(JobStatus::from_result(result));
                }
                Err(e) if retries_left > 0 && e.is_transient() => {
                    if policy
                        .deadline
                        .is_some_and(|deadline| started.elapsed() + delay > deadline)
                    {
                        tracing::warn!(
                            token = %token,
                            attempts,
                            error = %e,
                            "Deadline reached while retrying status query",
                        );
                        return Err(JobError::TimedOut {
                            token: token.clone(),
                            attempts,
                        });
                    }
                    retries_left -= 1;
                    tracing::warn!(
                        token = %token,
                        error = %e,
                        retries_left,
                        delay_ms = delay.as_millis() as u64,
                        "Status query failed, retrying",
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(cancelled(token)),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    delay = next_delay(delay, &retry.backoff);
                }
                Err(e) => {
                    tracing::error!(token = %token, error = %e, "Status query failed");
                    return Err(JobError::Poll {
                        token: token.clone(),
                        source: e,
                    });
                }
            }
        }
    }
}

fn cancelled(token: &JobToken) -> JobError {
    tracing::debug!(token = %token, "Stopped polling cancelled job");
    JobError::Cancelled {
        token: Some(token.clone()),
    }
}
