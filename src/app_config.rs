use anyhow::{bail, Context, Result};
use std::env;
use std::time::Duration;

/// Admin-side request timeout handed to librdkafka with the AlterConfigs call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);

/// How long the main queue is polled for the result event.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(10000);

pub const REQUEST_TIMEOUT_VAR: &str = "KTCFG_REQUEST_TIMEOUT_MS";
pub const POLL_TIMEOUT_VAR: &str = "KTCFG_POLL_TIMEOUT_MS";

/// The two windows are independent: the poll may give up before or after
/// librdkafka times the request out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub request_timeout: Duration,
    pub poll_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // dotenv belongs HERE, nowhere else
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            request_timeout: millis_var(&lookup, REQUEST_TIMEOUT_VAR)?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            poll_timeout: millis_var(&lookup, POLL_TIMEOUT_VAR)?
                .unwrap_or(DEFAULT_POLL_TIMEOUT),
        })
    }
}

fn millis_var<F>(lookup: &F, name: &str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };

    let ms: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a number of milliseconds, got `{raw}`"))?;

    if ms == 0 || ms > i32::MAX as u64 {
        bail!("{name} must be between 1 and {} milliseconds, got {ms}", i32::MAX);
    }

    Ok(Some(Duration::from_millis(ms)))
}
