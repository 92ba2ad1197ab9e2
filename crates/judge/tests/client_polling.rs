//! Polling behaviour of [`RemoteJobClient`] against a scripted service.
//!
//! All tests run on Tokio's paused clock, so suspensions complete
//! instantly while elapsed time is still measured exactly.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use coderun_core::execution::{ExecutionErrorKind, JobOutcome};
use coderun_core::types::{ExecutionRequest, JobToken};
use coderun_judge::client::{JobError, RemoteJobClient};
use coderun_judge::poll::{BackoffConfig, PollPolicy, RetryPolicy};
use coderun_judge::wire::SubmissionDetails;
use common::{accepted, queued, running, ScriptedApi, Step};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn client(api: &Arc<ScriptedApi>) -> RemoteJobClient<ScriptedApi> {
    RemoteJobClient::from_shared(Arc::clone(api))
}

fn token() -> JobToken {
    JobToken::new("job-1")
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_issues_one_call_and_returns_token() {
    let api = Arc::new(ScriptedApi::new([]).with_token("abc-123"));
    let request = ExecutionRequest::with_language_id(71, "print('hi')").with_stdin("x");

    let token = client(&api).submit(&request).await.unwrap();

    assert_eq!(token.as_str(), "abc-123");
    assert_eq!(api.submits(), 1);
    let sent = api.submitted.lock().unwrap();
    assert_eq!(sent[0].language_id, 71);
    assert_eq!(sent[0].source_code, "cHJpbnQoJ2hpJyk=");
    assert_eq!(sent[0].stdin, "eA==");
}

#[tokio::test]
async fn submit_failure_is_not_retried() {
    let api = Arc::new(ScriptedApi::new([]).failing_submit(503));
    let request = ExecutionRequest::with_language_id(54, "int main() {}");

    let err = client(&api).submit(&request).await.unwrap_err();

    assert_matches!(err, JobError::Submission(_));
    assert_eq!(api.submits(), 1);
    assert_eq!(api.polls(), 0);
}

#[tokio::test]
async fn unknown_language_is_rejected_without_network_call() {
    let api = Arc::new(ScriptedApi::new([]));
    let request = ExecutionRequest::with_language_id(9999, "");

    let err = client(&api).submit(&request).await.unwrap_err();

    assert_matches!(err, JobError::UnsupportedLanguage(9999));
    assert_eq!(api.submits(), 0);
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn polls_until_finished_with_interval_between_queries() {
    let api = Arc::new(ScriptedApi::new([queued(), queued(), running(), accepted("42\n")]));
    let policy = PollPolicy::default();
    let started = Instant::now();

    let outcome = client(&api)
        .await_result(&token(), &policy, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(api.polls(), 4);
    assert_matches!(&outcome, JobOutcome::Finished(result) if result.stdout_text().as_deref() == Some("42\n"));
    for gap in api.poll_gaps() {
        assert!(gap >= policy.interval, "queries were only {gap:?} apart");
    }
    assert!(started.elapsed() >= policy.interval * 3);
}

#[tokio::test(start_paused = true)]
async fn immediately_finished_job_needs_one_query_and_no_wait() {
    let api = Arc::new(ScriptedApi::new([accepted("done")]));
    let started = Instant::now();

    let outcome = client(&api)
        .await_result(&token(), &PollPolicy::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(api.polls(), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn service_may_skip_running() {
    let api = Arc::new(ScriptedApi::new([queued(), accepted("")]));

    let outcome = client(&api)
        .await_result(&token(), &PollPolicy::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(api.polls(), 2);
}

#[tokio::test(start_paused = true)]
async fn compile_error_is_delivered_as_data() {
    let compile_error = SubmissionDetails {
        compile_output: Some(coderun_core::encoding::encode(b"main.cpp:3:5: error: expected ';'")),
        ..SubmissionDetails::with_status(6, "Compilation Error")
    };
    let api = Arc::new(ScriptedApi::new([running(), Step::Details(compile_error)]));

    let outcome = client(&api)
        .await_result(&token(), &PollPolicy::default(), &CancellationToken::new())
        .await
        .unwrap();

    let JobOutcome::Failed(error) = outcome else {
        panic!("compile errors are failed outcomes");
    };
    assert_eq!(error.kind, ExecutionErrorKind::CompilationError);
    assert_eq!(
        error.result.compile_output_text().as_deref(),
        Some("main.cpp:3:5: error: expected ';'")
    );
}

#[tokio::test(start_paused = true)]
async fn unknown_terminal_code_keeps_raw_code() {
    let api = Arc::new(ScriptedApi::new([Step::Status(77, "Something New")]));

    let outcome = client(&api)
        .await_result(&token(), &PollPolicy::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert_matches!(
        outcome,
        JobOutcome::Failed(error) if error.kind == ExecutionErrorKind::Unknown && error.status_id() == 77
    );
}

#[tokio::test(start_paused = true)]
async fn malformed_output_is_reported() {
    let broken = SubmissionDetails {
        stdout: Some("@@not base64@@".into()),
        ..SubmissionDetails::with_status(3, "Accepted")
    };
    let api = Arc::new(ScriptedApi::new([Step::Details(broken)]));

    let err = client(&api)
        .await_result(&token(), &PollPolicy::default(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, JobError::MalformedResponse { .. });
}

// ---------------------------------------------------------------------------
// Poll failures
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn failed_query_surfaces_poll_error_and_stops() {
    let api = Arc::new(ScriptedApi::new([queued(), Step::Disconnect, accepted("late")]));

    let err = client(&api)
        .await_result(&token(), &PollPolicy::default(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, JobError::Poll { token, .. } if token.as_str() == "job-1");
    assert_eq!(api.polls(), 2);

    // No further queries happen after the failure.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(api.polls(), 2);
}

#[tokio::test(start_paused = true)]
async fn retry_policy_absorbs_transient_failures() {
    let api = Arc::new(ScriptedApi::new([
        queued(),
        Step::HttpError(502),
        Step::Disconnect,
        accepted("ok"),
    ]));
    let policy = PollPolicy::default().with_retry(RetryPolicy::with_retries(2));

    let outcome = client(&api)
        .await_result(&token(), &policy, &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(api.polls(), 4);
}

#[tokio::test(start_paused = true)]
async fn client_errors_are_not_retried() {
    let api = Arc::new(ScriptedApi::new([Step::HttpError(401), accepted("never")]));
    let policy = PollPolicy::default().with_retry(RetryPolicy::with_retries(5));

    let err = client(&api)
        .await_result(&token(), &policy, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, JobError::Poll { .. });
    assert_eq!(api.polls(), 1);
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn max_attempts_bounds_the_wait() {
    let api = Arc::new(ScriptedApi::new([queued()]));
    let policy = PollPolicy::default().with_max_attempts(5);

    let err = client(&api)
        .await_result(&token(), &policy, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, JobError::TimedOut { attempts: 5, .. });
    assert_eq!(api.polls(), 5);
}

#[tokio::test(start_paused = true)]
async fn deadline_bounds_the_wait() {
    let api = Arc::new(ScriptedApi::new([running()]));
    let policy = PollPolicy::default()
        .with_interval(Duration::from_secs(1))
        .with_deadline(Duration::from_millis(3500));

    let err = client(&api)
        .await_result(&token(), &policy, &CancellationToken::new())
        .await
        .unwrap_err();

    // Queries at 0s, 1s, 2s, 3s; the next one would start past 3.5s.
    assert_matches!(err, JobError::TimedOut { attempts: 4, .. });
}

#[tokio::test(start_paused = true)]
async fn deadline_bounds_retries_of_a_failing_query() {
    let mut script = vec![queued()];
    script.extend(std::iter::repeat(Step::Disconnect).take(5));
    script.push(accepted("too late"));
    let api = Arc::new(ScriptedApi::new(script));
    let policy = PollPolicy::default()
        .with_interval(Duration::from_secs(1))
        .with_deadline(Duration::from_millis(2500))
        .with_retry(RetryPolicy::with_retries(5));

    let started = Instant::now();
    let err = client(&api)
        .await_result(&token(), &policy, &CancellationToken::new())
        .await
        .unwrap_err();

    // Query at 0s, failed query at 1s, retry at 2s; the next retry
    // (2s delay) would end past 2.5s.
    assert_matches!(err, JobError::TimedOut { attempts: 2, .. });
    assert!(started.elapsed() <= Duration::from_millis(2500));
    assert_eq!(api.polls(), 3);
}

#[tokio::test(start_paused = true)]
async fn backoff_grows_the_interval() {
    let api = Arc::new(ScriptedApi::new([queued(), queued(), queued(), queued(), accepted("")]));
    let policy = PollPolicy::default()
        .with_interval(Duration::from_millis(500))
        .with_backoff(BackoffConfig {
            multiplier: 2.0,
            max_delay: Duration::from_millis(1500),
        });

    client(&api)
        .await_result(&token(), &policy, &CancellationToken::new())
        .await
        .unwrap();

    let gaps = api.poll_gaps();
    let expected = [500, 1000, 1500, 1500].map(Duration::from_millis);
    assert_eq!(gaps.len(), expected.len());
    for (gap, expected) in gaps.iter().zip(expected) {
        assert!(
            *gap >= expected && *gap < expected + Duration::from_millis(5),
            "expected a gap of {expected:?}, got {gap:?}"
        );
    }
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn cancel_before_scheduled_poll_prevents_it() {
    let api = Arc::new(ScriptedApi::new([queued(), accepted("too late")]));
    let cancel = CancellationToken::new();
    let client = client(&api);

    let waiter = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            client
                .await_result(&token(), &PollPolicy::default(), &cancel)
                .await
        })
    };

    // First query fires at t=0; the second would fire at t=2s.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(api.polls(), 1);
    cancel.cancel();

    let result = waiter.await.unwrap();
    assert_matches!(result, Err(JobError::Cancelled { token: Some(_) }));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(api.polls(), 1);
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_token_issues_no_query() {
    let api = Arc::new(ScriptedApi::new([accepted("x")]));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = client(&api)
        .await_result(&token(), &PollPolicy::default(), &cancel)
        .await;

    assert_matches!(result, Err(JobError::Cancelled { .. }));
    assert_eq!(api.polls(), 0);
}

#[tokio::test(start_paused = true)]
async fn run_submits_then_polls() {
    let api = Arc::new(ScriptedApi::new([running(), accepted("hello")]));
    let request = ExecutionRequest::with_language_id(63, "console.log('hello')");

    let outcome = client(&api)
        .run(&request, &PollPolicy::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.result().stdout_text().as_deref(), Some("hello"));
    assert_eq!(api.submits(), 1);
    assert_eq!(api.polls(), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_waits_are_independent() {
    let first = Arc::new(ScriptedApi::new([queued(), queued(), accepted("first")]).with_token("a"));
    let second = Arc::new(ScriptedApi::new([accepted("second")]).with_token("b"));
    let (first_client, second_client) = (client(&first), client(&second));
    let (first_token, second_token) = (JobToken::new("a"), JobToken::new("b"));
    let policy = PollPolicy::default();
    let cancel = CancellationToken::new();

    let (a, b) = tokio::join!(
        first_client.await_result(&first_token, &policy, &cancel),
        second_client.await_result(&second_token, &policy, &cancel),
    );

    assert_eq!(a.unwrap().result().stdout_text().as_deref(), Some("first"));
    assert_eq!(b.unwrap().result().stdout_text().as_deref(), Some("second"));
    assert_eq!(first.polls(), 3);
    assert_eq!(second.polls(), 1);
}
