/*
[INPUT]:  Store snapshots, history views, notices, console errors
[OUTPUT]: Styled text on stdout/stderr
[POS]:    CLI rendering helpers shared by one-shot and interactive modes
[UPDATE]: When changing what the task table or history blocks show
*/

use console::style;
use taskrunner_adapter::Task;
use taskrunner_console::form::ValidationErrors;
use taskrunner_console::{
    ConsoleError, ExecutionStatus, HistoryEntry, HistoryView, Notice, NoticeKind, StoreSnapshot,
};

const COMMAND_WIDTH: usize = 40;
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f UTC";

pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        match notice.kind {
            NoticeKind::Success => println!("{} {}", style("✔").green(), notice.message),
            NoticeKind::Info => println!("{} {}", style("ℹ").cyan(), notice.message),
            NoticeKind::Error => eprintln!("{} {}", style("✘").red(), style(&notice.message).red()),
        }
    }
}

/// Errors that never became a notice (rule violations, validation)
pub fn print_error(err: &ConsoleError) {
    match err {
        ConsoleError::Remote { .. } => {}
        ConsoleError::Validation(errors) => print_validation(errors),
        other => eprintln!("{} {}", style("✘").red(), style(other).red()),
    }
}

pub fn print_validation(errors: &ValidationErrors) {
    for error in errors.errors() {
        eprintln!(
            "{} {}: {}",
            style("✘").red(),
            style(error.field.label()).bold(),
            error.message
        );
    }
}

pub fn print_tasks(snapshot: &StoreSnapshot) {
    if let Some(query) = &snapshot.last_query {
        println!("{}", style(format!("Search results for \"{query}\"")).dim());
    }
    if snapshot.tasks.is_empty() {
        println!("{}", style("No tasks found.").yellow());
        return;
    }
    println!("{}", task_table(&snapshot.tasks));
}

pub fn print_task(task: &Task) {
    println!("{}", style(&task.name).bold());
    println!("  id:      {}", task.id);
    println!("  owner:   {}", task.owner);
    println!("  command: {}", task.command);
    println!("  runs:    {}", task.execution_count());
}

pub fn print_history(task: &Task, history: &HistoryView) {
    println!(
        "{}",
        style(format!("Execution history for {} ({})", task.name, task.id)).bold()
    );
    match history {
        HistoryView::Empty => println!("{}", style("No executions yet.").yellow()),
        HistoryView::Entries(entries) => {
            for entry in entries {
                println!("{}", history_block(entry));
            }
        }
    }
}

pub fn print_entry(entry: &HistoryEntry) {
    println!("{}", history_block(entry));
}

/// One line per task: id, name, owner, truncated command, run count
pub fn task_table(tasks: &[Task]) -> String {
    let header = ["ID", "NAME", "OWNER", "COMMAND", "RUNS"];
    let rows: Vec<[String; 5]> = tasks
        .iter()
        .map(|task| {
            [
                task.id.clone(),
                task.name.clone(),
                task.owner.clone(),
                truncate(&task.command, COMMAND_WIDTH),
                format!("{} runs", task.execution_count()),
            ]
        })
        .collect();

    let mut widths = header.map(|title| title.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(style(format_row(&header.map(str::to_string), &widths)).bold().to_string());
    lines.extend(rows.iter().map(|row| format_row(row, &widths)));
    lines.join("\n")
}

pub fn history_block(entry: &HistoryEntry) -> String {
    let glyph = match entry.status {
        ExecutionStatus::Success => style("✔").green(),
        ExecutionStatus::Failure => style("✘").red(),
    };
    let mut block = format!(
        "{glyph} {}\n  started:  {}\n  ended:    {}\n  duration: {}\n",
        style(entry.status).bold(),
        entry.start_time.format(TIME_FORMAT),
        entry.end_time.format(TIME_FORMAT),
        entry.duration_label(),
    );
    for line in entry.output.lines() {
        block.push_str("  | ");
        block.push_str(line);
        block.push('\n');
    }
    block
}

/// Select-list label for a task
pub fn task_label(task: &Task) -> String {
    format!(
        "{} | {} | {} | {} runs",
        task.id,
        task.name,
        task.owner,
        task.execution_count()
    )
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn format_row(cells: &[String; 5], widths: &[usize; 5]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
