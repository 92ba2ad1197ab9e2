//! Domain types shared by the coderun crates.
//!
//! Describes what a remote execution looks like independently of the
//! transport: the request, the job token, the status lifecycle, the
//! decoded result, and the static language catalogue.

pub mod encoding;
pub mod error;
pub mod execution;
pub mod language;
pub mod status;
pub mod types;
