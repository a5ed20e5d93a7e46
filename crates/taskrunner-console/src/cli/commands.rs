/*
[INPUT]:  One parsed subcommand
[OUTPUT]: Printed result and process exit code
[POS]:    CLI one-shot command layer
[UPDATE]: When adding subcommands
*/

use std::process::ExitCode;

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, theme::ColorfulTheme};
use taskrunner_console::notice::drain;
use taskrunner_console::{ConsoleError, ConsoleView, Notice, TaskForm};
use tokio::sync::mpsc::UnboundedReceiver;

use super::{Command, Console, render};

/// Run one subcommand. Console failures are printed and mapped to a failing
/// exit code; only terminal/prompt errors escape as `Err`.
pub async fn run(
    command: Command,
    console: &Console,
    mut notices: UnboundedReceiver<Notice>,
) -> Result<ExitCode> {
    let outcome = dispatch(command, console).await;
    render::print_notices(&drain(&mut notices));

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(CommandError::Console(err)) => {
            render::print_error(&err);
            Ok(ExitCode::FAILURE)
        }
        Err(CommandError::Prompt(err)) => Err(err),
    }
}

enum CommandError {
    Console(ConsoleError),
    Prompt(anyhow::Error),
}

impl From<ConsoleError> for CommandError {
    fn from(err: ConsoleError) -> Self {
        CommandError::Console(err)
    }
}

impl From<dialoguer::Error> for CommandError {
    fn from(err: dialoguer::Error) -> Self {
        CommandError::Prompt(err.into())
    }
}

async fn dispatch(command: Command, console: &Console) -> Result<(), CommandError> {
    match command {
        Command::List { id: Some(id) } => {
            let task = console.fetch_task(&id).await?;
            render::print_task(&task);
        }
        Command::List { id: None } => {
            console.refresh().await?;
            render::print_tasks(&console.snapshot());
        }
        Command::Search { query } => {
            console.search(&query).await?;
            render::print_tasks(&console.snapshot());
        }
        Command::Save {
            id,
            name,
            owner,
            command,
        } => {
            console.refresh().await?;
            if console.store().task(&id).is_some() {
                console.open_edit(&id)?;
            } else {
                console.open_create()?;
            }
            let form = TaskForm {
                id,
                name,
                owner,
                command,
            };
            let task = console
                .submit_form(form)
                .await
                .map_err(|rejection| rejection.error)?;
            render::print_task(&task);
        }
        Command::Run { id } => {
            println!("{}", style(format!("Running {id}...")).dim());
            let execution = console.execute(&id).await?;
            let view = console.project_history(std::slice::from_ref(&execution));
            for entry in view.entries() {
                render::print_entry(entry);
            }
        }
        Command::Delete { id, yes } => {
            console.refresh().await?;
            console.request_delete(&id)?;
            let confirmed = yes
                || Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!("Delete task {id}? This cannot be undone"))
                    .default(false)
                    .interact()
                    .inspect_err(|_| console.cancel())?;
            if confirmed {
                console.confirm_delete().await?;
            } else {
                console.cancel();
                println!("{}", style("Delete cancelled.").yellow());
            }
        }
        Command::History { id } => {
            console.refresh().await?;
            console.open_history(&id)?;
            let view = console.view();
            console.cancel();
            if let ConsoleView::ViewingHistory { task, history } = view {
                render::print_history(&task, &history);
            }
        }
        // Handled before the client is built
        Command::Config => {}
    }
    Ok(())
}
