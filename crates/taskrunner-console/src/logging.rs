/*
[INPUT]:  Log level directive and where log lines should go
[OUTPUT]: Installed global tracing subscriber (plus file writer guard)
[POS]:    Logging bootstrap - called once from the binary
[UPDATE]: When changing log destinations or formats
*/

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "taskrunner-console";

/// Destination for log lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// One-shot commands: plain stderr
    Stderr,
    /// Interactive session: daily-rolling files so logs never mix with prompts
    File(PathBuf),
}

/// Install the global subscriber. Keep the returned guard alive for the
/// process lifetime or buffered file lines are lost.
pub fn init_tracing(level: &str, target: &LogTarget) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(level).context("invalid log level")?;

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|err| anyhow!(err))
                .context("initialize tracing subscriber")?;
            Ok(None)
        }
        LogTarget::File(directory) => {
            let appender = file_appender(directory)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|err| anyhow!(err))
                .context("initialize tracing subscriber")?;
            Ok(Some(guard))
        }
    }
}

fn file_appender(directory: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(directory)
        .with_context(|| format!("create log directory {}", directory.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(directory)
        .with_context(|| format!("open log file in {}", directory.display()))
}
