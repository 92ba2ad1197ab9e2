//! Well-known status ID constants reported by the execution service.
//!
//! Ids 1 and 2 are the only non-terminal states. Anything else,
//! including ids not listed here, ends the job.

/// Submission is waiting in the service queue.
pub const STATUS_IN_QUEUE: i32 = 1;

/// Submission is being compiled or run.
pub const STATUS_PROCESSING: i32 = 2;

/// Program ran to completion.
pub const STATUS_ACCEPTED: i32 = 3;

/// Output differed from the expected output (only when one was supplied).
pub const STATUS_WRONG_ANSWER: i32 = 4;

/// Program exceeded the CPU or wall-time limit.
pub const STATUS_TIME_LIMIT_EXCEEDED: i32 = 5;

/// Source failed to compile; details are in `compile_output`.
pub const STATUS_COMPILATION_ERROR: i32 = 6;

pub const STATUS_RUNTIME_ERROR_SIGSEGV: i32 = 7;
pub const STATUS_RUNTIME_ERROR_SIGXFSZ: i32 = 8;
pub const STATUS_RUNTIME_ERROR_SIGFPE: i32 = 9;
pub const STATUS_RUNTIME_ERROR_SIGABRT: i32 = 10;
pub const STATUS_RUNTIME_ERROR_NZEC: i32 = 11;
pub const STATUS_RUNTIME_ERROR_OTHER: i32 = 12;

/// The service itself failed while handling the submission.
pub const STATUS_INTERNAL_ERROR: i32 = 13;

/// The compiled artifact could not be executed.
pub const STATUS_EXEC_FORMAT_ERROR: i32 = 14;

/// Whether a status id denotes a job that is still queued or running.
pub fn is_pending(status_id: i32) -> bool {
    status_id == STATUS_IN_QUEUE || status_id == STATUS_PROCESSING
}

/// Signal label for the runtime-error ids, `None` for any other id.
pub fn runtime_error_label(status_id: i32) -> Option<&'static str> {
    match status_id {
        STATUS_RUNTIME_ERROR_SIGSEGV => Some("SIGSEGV"),
        STATUS_RUNTIME_ERROR_SIGXFSZ => Some("SIGXFSZ"),
        STATUS_RUNTIME_ERROR_SIGFPE => Some("SIGFPE"),
        STATUS_RUNTIME_ERROR_SIGABRT => Some("SIGABRT"),
        STATUS_RUNTIME_ERROR_NZEC => Some("NZEC"),
        STATUS_RUNTIME_ERROR_OTHER => Some("Other"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
