mod list;
mod logging;
mod tui;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tasklist_core::repository::default_data_dir;
use tasklist_core::{
    parse_draft, FileStorage, FilterMode, PersistMode, SortOrder, StoreConfig, TaskCommand, TaskId, TaskStore,
    ViewQuery,
};
use tracing::error;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "A small task list kept in a local store", long_about = None)]
struct Cli {
    /// Directory holding todos.json and config.json (default: ~/.tasklist)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Write tasks once when the command ends instead of after every change
    #[arg(long, global = true)]
    write_behind: bool,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Add a task (usage: add Buy milk category:Shopping date:tomorrow)
    Add {
        /// Task text plus optional category:/date: metadata
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },
    /// List tasks
    List {
        /// Case-insensitive text search
        #[arg(short, long, default_value = "")]
        search: String,
        /// all, completed or active
        #[arg(short, long, default_value = "all")]
        filter: FilterMode,
        /// asc or desc, by task text
        #[arg(long, default_value = "asc")]
        sort: SortOrder,
    },
    /// Flip a task between active and completed
    #[command(visible_alias = "done")]
    Toggle { id: TaskId },
    /// Remove a task
    #[command(visible_alias = "rm")]
    Remove { id: TaskId },
    /// Open the terminal user interface
    Tui,
}

fn open_store(cli: &Cli, data_dir: PathBuf) -> Result<TaskStore<FileStorage>> {
    let mut config = StoreConfig::load(&data_dir);
    // A data_dir inside config.json redirects the store unless --data-dir was given.
    if cli.data_dir.is_some() || config.data_dir.is_none() {
        config.data_dir = Some(data_dir);
    }
    if cli.write_behind {
        config.persist = PersistMode::WriteBehind;
    }
    let storage = config.open_storage()?;
    Ok(TaskStore::open(storage, config.persist))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));

    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => default_data_dir()?,
    };
    // Logs would corrupt the alternate screen, so the TUI logs to a file.
    let log_file = interactive.then(|| data_dir.join(logging::LOG_FILE_NAME));
    logging::init(cli.verbose, log_file.as_deref())?;

    let mut store = open_store(&cli, data_dir)?;

    match cli.command {
        Some(Commands::Add { args }) => {
            let draft = parse_draft(&args)?;
            let tasks = store.apply(TaskCommand::Add(draft));
            if let Some(task) = tasks.last() {
                println!("Task added: {} (ID: {})", task.text, task.id);
                if !task.category.is_empty() {
                    println!("  Category: {}", task.category);
                }
                if !task.date.is_empty() {
                    println!("  Date: {}", task.date);
                }
            }
        }
        Some(Commands::List { search, filter, sort }) => {
            let query = ViewQuery { search, filter, sort };
            let view = query.apply(store.tasks());
            if view.is_empty() {
                println!("No tasks found.");
            } else {
                println!("{}", list::render(&view));
            }
        }
        Some(Commands::Toggle { id }) => {
            if store.get(id).is_none() {
                println!("No task with ID {}.", id);
            } else {
                store.apply(TaskCommand::ToggleComplete(id));
                if let Some(task) = store.get(id) {
                    let state = if task.is_completed { "completed" } else { "active" };
                    println!("Task {} is now {}: {}", id, state, task.text);
                }
            }
        }
        Some(Commands::Remove { id }) => match store.get(id).map(|t| t.text.clone()) {
            Some(text) => {
                store.apply(TaskCommand::Remove(id));
                println!("Task removed: {} (ID: {})", text, id);
            }
            None => println!("No task with ID {}.", id),
        },
        Some(Commands::Tui) | None => {
            tui::run(&mut store)?;
        }
    }

    if store.is_dirty() {
        if let Err(e) = store.flush() {
            error!(error = %format!("{:#}", e), "final write failed");
            eprintln!("Warning: tasks could not be saved: {:#}", e);
        }
    }
    Ok(())
}
