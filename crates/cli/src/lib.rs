//! `coderun-cli` library crate.
//!
//! Argument parsing, the foreground wait loop and output rendering for
//! the `coderun` binary,
//! exposed for integration testing. The entrypoint lives in `main.rs`.

pub mod args;
pub mod render;
pub mod runner;
