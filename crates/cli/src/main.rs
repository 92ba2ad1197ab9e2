//! `coderun` -- run a source file on a remote execution service.
//!
//! Submits the file, polls until the service reports a terminal status,
//! and prints the program output followed by status, memory and time.
//! Ctrl-C cancels the job; no result is printed afterwards.
//!
//! # Environment variables
//!
//! | Variable                     | Required | Default | Description                          |
//! |------------------------------|----------|---------|--------------------------------------|
//! | `JUDGE_API_URL`              | yes      | --      | Submission endpoint URL              |
//! | `JUDGE_API_KEY`              | no       | --      | Sent as `X-RapidAPI-Key`             |
//! | `JUDGE_API_HOST`             | no       | --      | Sent as `X-RapidAPI-Host`            |
//! | `JUDGE_POLL_INTERVAL_MS`     | no       | `2000`  | Delay between status queries         |
//! | `JUDGE_MAX_POLL_ATTEMPTS`    | no       | --      | Give up after this many queries      |
//! | `JUDGE_POLL_DEADLINE_SECS`   | no       | --      | Give up after this many seconds      |
//! | `JUDGE_POLL_RETRIES`         | no       | `0`     | Retries for a failed status query    |
//! | `JUDGE_REQUEST_TIMEOUT_SECS` | no       | `10`    | HTTP timeout per request             |

use std::io::Read;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use coderun_cli::args::{Action, Cli, RunArgs, StdinSource};
use coderun_cli::render;
use coderun_cli::runner::{self, RunEnd};
use coderun_core::types::ExecutionRequest;
use coderun_judge::{JobSession, JudgeConfig, RemoteJobClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coderun=info,coderun_judge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match Cli::parse().into_action() {
        Action::ListLanguages => {
            print!("{}", render::language_table());
            Ok(ExitCode::SUCCESS)
        }
        Action::Run(run) => run_job(run).await,
    }
}

async fn run_job(run: RunArgs) -> anyhow::Result<ExitCode> {
    let config = JudgeConfig::from_env().context("Failed to load execution service configuration")?;
    tracing::info!(api_url = %config.api_url, "Loaded execution service configuration");

    let source = std::fs::read(&run.source_path)
        .with_context(|| format!("Failed to read {}", run.source_path.display()))?;
    let stdin = match &run.stdin {
        StdinSource::Empty => Vec::new(),
        StdinSource::File(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        StdinSource::Inherit => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read standard input")?;
            buf
        }
    };

    let client = RemoteJobClient::from_config(&config).context("Failed to build HTTP client")?;
    let mut session = JobSession::new(client, config.poll.clone());

    let request = ExecutionRequest::new(run.language, source).with_stdin(stdin);
    session.start(request);
    eprintln!("Processing... ({})", run.language.label);

    let code = match runner::wait_for_end(&mut session, tokio::signal::ctrl_c()).await {
        RunEnd::Completed(outcome) => {
            print!("{}", render::report(&outcome));
            eprintln!("{}", render::SUCCESS_NOTICE);
            if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        RunEnd::Failed(e) => {
            tracing::error!(error = %e, "Job failed");
            eprintln!("{}", render::FAILURE_NOTICE);
            ExitCode::FAILURE
        }
        RunEnd::Interrupted => {
            eprintln!("Cancelled.");
            ExitCode::from(130)
        }
        RunEnd::Abandoned => ExitCode::FAILURE,
    };
    Ok(code)
}
