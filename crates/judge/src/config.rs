use std::fmt;
use std::time::Duration;

use crate::poll::{PollPolicy, RetryPolicy};

pub const ENV_API_URL: &str = "JUDGE_API_URL";
pub const ENV_API_KEY: &str = "JUDGE_API_KEY";
pub const ENV_API_HOST: &str = "JUDGE_API_HOST";
pub const ENV_POLL_INTERVAL_MS: &str = "JUDGE_POLL_INTERVAL_MS";
pub const ENV_MAX_POLL_ATTEMPTS: &str = "JUDGE_MAX_POLL_ATTEMPTS";
pub const ENV_POLL_DEADLINE_SECS: &str = "JUDGE_POLL_DEADLINE_SECS";
pub const ENV_POLL_RETRIES: &str = "JUDGE_POLL_RETRIES";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "JUDGE_REQUEST_TIMEOUT_SECS";

/// Default HTTP timeout for a single request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Connection settings for the execution service.
///
/// The URL, key and host are opaque deployment secrets. The key is
/// never printed by the `Debug` impl.
#[derive(Clone)]
pub struct JudgeConfig {
    /// Submission endpoint, e.g. `https://judge0-ce.p.rapidapi.com/submissions`.
    /// Status queries go to `{api_url}/{token}`.
    pub api_url: String,
    /// Sent as `X-RapidAPI-Key` when present.
    pub api_key: Option<String>,
    /// Sent as `X-RapidAPI-Host` when present.
    pub api_host: Option<String>,
    pub request_timeout: Duration,
    pub poll: PollPolicy,
}

impl fmt::Debug for JudgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JudgeConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_host", &self.api_host)
            .field("request_timeout", &self.request_timeout)
            .field("poll", &self.poll)
            .finish()
    }
}

impl JudgeConfig {
    /// Configuration with defaults for everything except the URL.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            api_host: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll: PollPolicy::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                      | Default        |
    /// |------------------------------|----------------|
    /// | `JUDGE_API_URL`              | required       |
    /// | `JUDGE_API_KEY`              | unset          |
    /// | `JUDGE_API_HOST`             | unset          |
    /// | `JUDGE_POLL_INTERVAL_MS`     | `2000`         |
    /// | `JUDGE_MAX_POLL_ATTEMPTS`    | unbounded      |
    /// | `JUDGE_POLL_DEADLINE_SECS`   | unbounded      |
    /// | `JUDGE_POLL_RETRIES`         | `0`            |
    /// | `JUDGE_REQUEST_TIMEOUT_SECS` | `10`           |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let api_url = get(ENV_API_URL).ok_or(ConfigError::Missing(ENV_API_URL))?;
        let mut config = Self::new(api_url.trim());
        config.api_key = get(ENV_API_KEY);
        config.api_host = get(ENV_API_HOST);

        if let Some(ms) = parse::<u64>(ENV_POLL_INTERVAL_MS, get(ENV_POLL_INTERVAL_MS))? {
            // A zero interval would query the service back to back.
            if ms == 0 {
                return Err(ConfigError::Invalid {
                    var: ENV_POLL_INTERVAL_MS,
                    value: ms.to_string(),
                });
            }
            config.poll.interval = Duration::from_millis(ms);
        }
        config.poll.max_attempts = parse(ENV_MAX_POLL_ATTEMPTS, get(ENV_MAX_POLL_ATTEMPTS))?;
        config.poll.deadline = parse::<u64>(ENV_POLL_DEADLINE_SECS, get(ENV_POLL_DEADLINE_SECS))?
            .map(Duration::from_secs);
        if let Some(retries) = parse::<u32>(ENV_POLL_RETRIES, get(ENV_POLL_RETRIES))? {
            config.poll.retry = RetryPolicy::with_retries(retries);
        }
        if let Some(secs) = parse::<u64>(ENV_REQUEST_TIMEOUT_SECS, get(ENV_REQUEST_TIMEOUT_SECS))? {
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(
    var: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { var, value: raw })
        })
        .transpose()
}
