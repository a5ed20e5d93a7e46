/*
[INPUT]:  CLI arguments, optional YAML configuration file, TASKRUNNER__* env vars
[OUTPUT]: One-shot command result or an interactive console session
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags or startup flow
*/

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use taskrunner_adapter::TaskRunnerClient;
use taskrunner_console::logging::{LogTarget, init_tracing};
use taskrunner_console::{ConfigOverrides, ConsoleConfig, ConsoleCoordinator, Notifier};

#[derive(Parser, Debug)]
#[command(
    name = "taskrunner-console",
    version,
    about = "Manage and run tasks on a remote task runner service"
)]
struct Cli {
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    /// Overrides api.base_url, e.g. http://localhost:8080/api
    #[arg(long = "base-url", value_name = "URL", global = true)]
    base_url: Option<String>,
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    log_level: Option<String>,
    /// Without a subcommand an interactive menu is started
    #[command(subcommand)]
    command: Option<cli::Command>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Cli::parse();

    let overrides = ConfigOverrides {
        base_url: args.base_url.clone(),
        log_level: args.log_level.clone(),
    };
    let config = ConsoleConfig::load(args.config_path.as_deref(), &overrides)?;
    if matches!(args.command, Some(cli::Command::Config)) {
        print!("{}", config.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let target = match args.command {
        Some(_) => LogTarget::Stderr,
        None => LogTarget::File(config.log_directory()),
    };
    let _log_guard = init_tracing(&config.logging.level, &target)?;

    info!(
        base_url = %config.api.base_url,
        interactive = args.command.is_none(),
        "starting taskrunner-console"
    );

    let client = TaskRunnerClient::with_config(config.client_config())
        .context("build task service client")?;
    let (notifier, notices) = Notifier::channel();
    let console = ConsoleCoordinator::new(Arc::new(client), config.projector(), notifier);

    match args.command {
        Some(command) => cli::commands::run(command, &console, notices).await,
        None => cli::interactive::run_interactive(&console, notices).await,
    }
}
