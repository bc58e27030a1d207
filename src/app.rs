//! One invocation from raw arguments to exit status.

use std::ffi::OsString;
use std::io::Write;

use tracing::{error, info};

use crate::admin::alter_topic_config;
use crate::app_config::AppConfig;
use crate::cli;
use crate::error::AlterError;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Runs the tool over the full argument list (program name first) and
/// returns the process exit status. Diagnostics are written to `stderr`.
pub async fn run<I, W>(args: I, stderr: &mut W) -> u8
where
    I: IntoIterator<Item = OsString>,
    W: Write,
{
    let mut args = args.into_iter();
    let program = args
        .next()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ktcfg".to_string());

    let request = match cli::parse_args(args) {
        Ok(request) => request,
        Err(e) => {
            writeln!(stderr, "{}", AlterError::from(e).report()).ok();
            writeln!(stderr, "{}", cli::usage(&program)).ok();
            return EXIT_FAILURE;
        }
    };

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            writeln!(stderr, "[ERROR config] {e:#}").ok();
            return EXIT_FAILURE;
        }
    };

    info!(
        topic = %request.topic,
        key = %request.key,
        value = %request.value,
        brokers = %request.brokers,
        "Altering topic config"
    );

    // All librdkafka handles are created and released on this one thread.
    let result =
        tokio::task::spawn_blocking(move || alter_topic_config(&request, &config)).await;

    match result {
        Ok(Ok(topic)) => {
            info!("✓ Config altered for topic {}", topic);
            EXIT_SUCCESS
        }
        Ok(Err(e)) => {
            writeln!(stderr, "{}", e.report()).ok();
            EXIT_FAILURE
        }
        Err(e) => {
            error!("Admin task crashed: {e}");
            writeln!(stderr, "[ERROR internal] {e}").ok();
            EXIT_FAILURE
        }
    }
}
