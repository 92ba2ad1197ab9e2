//! Client for a remote code-execution service.
//!
//! Submits [`ExecutionRequest`](coderun_core::types::ExecutionRequest)s
//! over HTTP, polls the status endpoint until the job reaches a
//! terminal state, and decodes the base64 output fields into an
//! [`ExecutionResult`](coderun_core::execution::ExecutionResult).
//!
//! - [`api`] wraps the two REST endpoints with [`reqwest`].
//! - [`client`] drives submission and the bounded polling loop.
//! - [`session`] owns the single active job of a caller and discards
//!   results from superseded runs.

pub mod api;
pub mod client;
pub mod config;
pub mod events;
pub mod poll;
pub mod session;
pub mod wire;

pub use api::{JobApi, JudgeApi, JudgeApiError};
pub use client::{JobError, RemoteJobClient};
pub use config::{ConfigError, JudgeConfig};
pub use events::{JobEvent, JobEventKind};
pub use poll::{BackoffConfig, PollPolicy, RetryPolicy};
pub use session::JobSession;
