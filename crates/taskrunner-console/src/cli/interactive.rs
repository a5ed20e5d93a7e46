/*
[INPUT]:  Console coordinator and user input via dialoguer prompts
[OUTPUT]: Menu-driven task management session
[POS]:    CLI interactive flow
[UPDATE]: When adding menu actions
*/

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use taskrunner_adapter::Task;
use taskrunner_console::form::FormField;
use taskrunner_console::notice::drain;
use taskrunner_console::{ConsoleError, Notice, TaskForm};
use tokio::sync::mpsc::UnboundedReceiver;

use super::{Console, render};

const ACTIONS: [&str; 8] = [
    "Refresh",
    "Search",
    "New task",
    "Edit task",
    "Run task",
    "Show history",
    "Delete task",
    "Quit",
];

pub async fn run_interactive(
    console: &Console,
    mut notices: UnboundedReceiver<Notice>,
) -> Result<ExitCode> {
    let theme = ColorfulTheme::default();
    println!("{}", style("Task Runner Console").bold().cyan());

    // Failures surface as notices on the first pass of the loop
    let _ = console.refresh().await;

    loop {
        render::print_notices(&drain(&mut notices));
        println!();
        render::print_tasks(&console.snapshot());
        println!();

        let Some(selection) = interrupted_as_none(
            Select::with_theme(&theme)
                .with_prompt("Select action")
                .items(&ACTIONS[..])
                .default(0)
                .interact_opt(),
        )?
        .flatten() else {
            break;
        };

        let result = match selection {
            0 => console.refresh().await.map(drop),
            1 => search(console, &theme).await?,
            2 => edit_form(console, &theme, None).await?,
            3 => match select_task(console, &theme, "Task to edit", |_| true)? {
                Some(task) => edit_form(console, &theme, Some(task)).await?,
                None => Ok(()),
            },
            4 => match select_task(console, &theme, "Task to run", |_| true)? {
                Some(task) => run_task(console, &task).await,
                None => Ok(()),
            },
            5 => match select_task(console, &theme, "Task history", Task::has_history)? {
                Some(task) => show_history(console, &task),
                None => Ok(()),
            },
            6 => match select_task(console, &theme, "Task to delete", |_| true)? {
                Some(task) => delete_task(console, &theme, &task).await?,
                None => Ok(()),
            },
            _ => break,
        };

        if let Err(err) = result {
            render::print_error(&err);
        }
    }

    println!("{}", style("Bye.").dim());
    Ok(ExitCode::SUCCESS)
}

/// Ctrl-C inside a prompt ends the session instead of failing it
fn interrupted_as_none<T>(result: dialoguer::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(dialoguer::Error::IO(err)) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(err) => Err(err.into()),
    }
}

async fn search(console: &Console, theme: &ColorfulTheme) -> Result<Result<(), ConsoleError>> {
    let Some(query) = interrupted_as_none(
        Input::<String>::with_theme(theme)
            .with_prompt("Search by name (empty shows all)")
            .allow_empty(true)
            .interact_text(),
    )?
    else {
        return Ok(Ok(()));
    };
    Ok(console.search(&query).await.map(drop))
}

fn select_task(
    console: &Console,
    theme: &ColorfulTheme,
    prompt: &str,
    eligible: impl Fn(&Task) -> bool,
) -> Result<Option<Task>> {
    let tasks: Vec<Task> = console
        .snapshot()
        .tasks
        .into_iter()
        .filter(|task| eligible(task))
        .collect();
    if tasks.is_empty() {
        println!("{}", style("No matching tasks.").yellow());
        return Ok(None);
    }

    let items: Vec<String> = tasks.iter().map(render::task_label).collect();
    let selection = interrupted_as_none(
        Select::with_theme(theme)
            .with_prompt(prompt)
            .items(&items)
            .default(0)
            .interact_opt(),
    )?
    .flatten();

    Ok(selection.map(|index| tasks[index].clone()))
}

/// Create (`task == None`) or edit form session. A rejected submit keeps
/// the entered values and offers another attempt.
async fn edit_form(
    console: &Console,
    theme: &ColorfulTheme,
    task: Option<Task>,
) -> Result<Result<(), ConsoleError>> {
    let opened = match &task {
        Some(task) => console.open_edit(&task.id),
        None => console.open_create(),
    };
    let mut form = match opened {
        Ok(form) => form,
        Err(err) => return Ok(Err(err)),
    };

    println!(
        "{}",
        style(if task.is_some() { "Edit task" } else { "Create new task" }).bold()
    );

    loop {
        let Some(entered) = prompt_fields(theme, form, task.is_some())? else {
            console.cancel();
            return Ok(Ok(()));
        };

        let rejection = match console.submit_form(entered).await {
            Ok(_) => return Ok(Ok(())),
            Err(rejection) => rejection,
        };
        // Remote failures were already reported as a notice
        render::print_error(&rejection.error);

        let retry = interrupted_as_none(
            Confirm::with_theme(theme)
                .with_prompt("Edit and resubmit?")
                .default(true)
                .interact(),
        )?
        .unwrap_or(false);
        if !retry {
            console.cancel();
            return Ok(Ok(()));
        }
        form = rejection.form;
    }
}

fn prompt_fields(
    theme: &ColorfulTheme,
    mut form: TaskForm,
    editing: bool,
) -> Result<Option<TaskForm>> {
    for field in FormField::ALL {
        if editing && field == FormField::Id {
            println!("{} {}", style("Task ID:").dim(), form.id);
            continue;
        }
        let Some(value) = interrupted_as_none(
            Input::<String>::with_theme(theme)
                .with_prompt(field.label())
                .with_initial_text(form.value(field))
                .allow_empty(true)
                .interact_text(),
        )?
        else {
            return Ok(None);
        };
        form.set(field, value);
    }
    Ok(Some(form))
}

async fn run_task(console: &Console, task: &Task) -> Result<(), ConsoleError> {
    println!("{}", style(format!("Running {}...", task.id)).dim());
    let execution = console.execute(&task.id).await?;
    for entry in console
        .project_history(std::slice::from_ref(&execution))
        .entries()
    {
        render::print_entry(entry);
    }
    Ok(())
}

fn show_history(console: &Console, task: &Task) -> Result<(), ConsoleError> {
    let history = console.open_history(&task.id)?;
    render::print_history(task, &history);
    console.cancel();
    Ok(())
}

async fn delete_task(
    console: &Console,
    theme: &ColorfulTheme,
    task: &Task,
) -> Result<Result<(), ConsoleError>> {
    if let Err(err) = console.request_delete(&task.id) {
        return Ok(Err(err));
    }

    let confirmed = interrupted_as_none(
        Confirm::with_theme(theme)
            .with_prompt(format!("Delete task {} ({})?", task.name, task.id))
            .default(false)
            .interact(),
    );
    match confirmed {
        Ok(Some(true)) => Ok(console.confirm_delete().await),
        Ok(_) => {
            console.cancel();
            Ok(Ok(()))
        }
        Err(err) => {
            console.cancel();
            Err(err)
        }
    }
}
