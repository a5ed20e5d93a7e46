/*
[INPUT]:  Parsed CLI subcommands and the console coordinator
[OUTPUT]: Terminal rendering of tasks, history and notices
[POS]:    CLI layer - rendering surface for the console core
[UPDATE]: When adding subcommands or menu actions
*/

use clap::Subcommand;
use taskrunner_adapter::TaskRunnerClient;
use taskrunner_console::ConsoleCoordinator;

pub mod commands;
pub mod interactive;
pub mod render;

pub type Console = ConsoleCoordinator<TaskRunnerClient>;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show all tasks, or a single task by id
    List {
        #[arg(long, value_name = "ID")]
        id: Option<String>,
    },
    /// Find tasks whose name contains QUERY
    Search { query: String },
    /// Create a task, or update it when the id already exists
    Save {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        owner: String,
        #[arg(long)]
        command: String,
    },
    /// Execute a task and print its output
    Run { id: String },
    /// Delete a task
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show the execution history of a task
    History { id: String },
    /// Print the effective configuration as YAML
    Config,
}
