//! Waiting on a [`JobSession`] until its job ends or the user interrupts.

use std::future::Future;

use coderun_core::execution::JobOutcome;
use coderun_judge::{JobApi, JobError, JobEventKind, JobSession};

/// How a foreground run ended.
#[derive(Debug)]
pub enum RunEnd {
    /// The service reported a terminal status.
    Completed(JobOutcome),
    /// The client could not obtain a terminal status.
    Failed(JobError),
    /// `shutdown` resolved first; the job was cancelled.
    Interrupted,
    /// The session stopped delivering events without a terminal one.
    Abandoned,
}

/// Drain `session` events until a terminal event arrives or `shutdown`
/// resolves.
///
/// `shutdown` is polled across every event, so a signal that fires
/// while an event is being handled is still observed.
pub async fn wait_for_end<A, F>(session: &mut JobSession<A>, shutdown: F) -> RunEnd
where
    A: JobApi + 'static,
    F: Future,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = session.next_event() => {
                let Some(event) = event else {
                    return RunEnd::Abandoned;
                };
                match event.kind {
                    JobEventKind::Submitted { token } => {
                        tracing::info!(token = %token, "Waiting for result");
                    }
                    JobEventKind::Polled { attempt, status, .. } => {
                        tracing::debug!(attempt, status, "Job still in progress");
                    }
                    JobEventKind::Completed { outcome, .. } => return RunEnd::Completed(outcome),
                    JobEventKind::Errored(e) => return RunEnd::Failed(e),
                }
            }
            _ = &mut shutdown => {
                session.cancel();
                return RunEnd::Interrupted;
            }
        }
    }
}
