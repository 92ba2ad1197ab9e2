//! Caller-owned state for "the single active job".
//!
//! [`JobSession`] replaces ambient UI state: it holds one active run at a
//! time, cancels the previous run when a new one starts, and stamps every
//! [`JobEvent`] with a generation number. Events from a superseded or
//! cancelled run are never returned by [`JobSession::next_event`], so a
//! slow old job cannot overwrite the result of a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use coderun_core::types::ExecutionRequest;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::api::{JobApi, JudgeApi};
use crate::client::{JobError, RemoteJobClient};
use crate::events::{JobEvent, JobEventKind};
use crate::poll::PollPolicy;

/// Runs jobs one at a time on behalf of a single consumer.
pub struct JobSession<A: JobApi + 'static = JudgeApi> {
    client: RemoteJobClient<A>,
    policy: PollPolicy,
    /// Generation of the live run; bumped on every start and cancel.
    current: Arc<AtomicU64>,
    active: Option<ActiveJob>,
    event_tx: mpsc::UnboundedSender<JobEvent>,
    event_rx: mpsc::UnboundedReceiver<JobEvent>,
}

/// Internal bookkeeping for the live run.
struct ActiveJob {
    generation: u64,
    cancel: CancellationToken,
    /// Set once the terminal event has been handed out.
    finished: bool,
}

impl<A: JobApi + 'static> JobSession<A> {
    pub fn new(client: RemoteJobClient<A>, policy: PollPolicy) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            client,
            policy,
            current: Arc::new(AtomicU64::new(0)),
            active: None,
            event_tx,
            event_rx,
        }
    }

    /// Start a run, superseding any run still in flight.
    ///
    /// Spawns the submit-and-poll task on the current Tokio runtime and
    /// returns the generation that tags its events.
    pub fn start(&mut self, request: ExecutionRequest) -> u64 {
        self.cancel();

        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        let emitter = Emitter {
            generation,
            current: Arc::clone(&self.current),
            cancel: cancel.clone(),
            tx: self.event_tx.clone(),
        };

        tracing::info!(
            generation,
            language_id = request.language_id(),
            "Starting job",
        );

        tokio::spawn(drive(
            self.client.clone(),
            request,
            self.policy.clone(),
            cancel.clone(),
            emitter,
        ));

        self.active = Some(ActiveJob {
            generation,
            cancel,
            finished: false,
        });
        generation
    }

    /// Cancel the live run. Returns `false` when nothing was running.
    ///
    /// No event of the cancelled run is delivered afterwards, even one
    /// that was already queued.
    pub fn cancel(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.cancel.cancel();
        self.current.fetch_add(1, Ordering::SeqCst);
        tracing::info!(generation = active.generation, "Cancelled job");
        true
    }

    /// Next event of the live run.
    ///
    /// Returns `None` when there is no live run or its terminal event has
    /// already been returned.
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        loop {
            let active = self.active.as_mut()?;
            if active.finished {
                return None;
            }

            let event = self.event_rx.recv().await?;
            if event.generation != active.generation {
                tracing::debug!(
                    generation = event.generation,
                    active = active.generation,
                    "Discarding event from superseded job",
                );
                continue;
            }

            if event.kind.is_terminal() {
                active.finished = true;
            }
            return Some(event);
        }
    }

    /// Whether the live run has not yet delivered its terminal event.
    pub fn is_processing(&self) -> bool {
        self.active.as_ref().is_some_and(|active| !active.finished)
    }

    pub fn current_generation(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }
}

impl<A: JobApi + 'static> Drop for JobSession<A> {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            active.cancel.cancel();
        }
    }
}

/// Sends events for one run while that run is still the live one.
struct Emitter {
    generation: u64,
    current: Arc<AtomicU64>,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<JobEvent>,
}

impl Emitter {
    fn emit(&self, kind: JobEventKind) {
        if self.cancel.is_cancelled() || self.current.load(Ordering::SeqCst) != self.generation {
            tracing::debug!(generation = self.generation, "Suppressed event for stale job");
            return;
        }
        // The receiver lives as long as the session; a send error only
        // means the session is gone.
        let _ = self.tx.send(JobEvent::new(self.generation, kind));
    }
}

/// Submit, poll, and report one run.
async fn drive<A: JobApi>(
    client: RemoteJobClient<A>,
    request: ExecutionRequest,
    policy: PollPolicy,
    cancel: CancellationToken,
    emitter: Emitter,
) {
    let token = match client.submit_cancellable(&request, &cancel).await {
        Ok(token) => token,
        Err(JobError::Cancelled { .. }) => return,
        Err(e) => {
            emitter.emit(JobEventKind::Errored(e));
            return;
        }
    };

    emitter.emit(JobEventKind::Submitted {
        token: token.clone(),
    });

    let result = client
        .await_result_with(&token, &policy, &cancel, |attempt, status| {
            emitter.emit(JobEventKind::Polled {
                token: token.clone(),
                attempt,
                status: status.label(),
            });
        })
        .await;

    match result {
        Ok(outcome) => emitter.emit(JobEventKind::Completed { token, outcome }),
        Err(JobError::Cancelled { .. }) => {}
        Err(e) => emitter.emit(JobEventKind::Errored(e)),
    }
}
