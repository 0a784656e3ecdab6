use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use eyre::{Result, eyre};
use std::path::{Path, PathBuf};
use tasklist::{FileKv, KvStore, SearchFilter, SqliteKv, StoreEvent, SubmitOutcome, TaskForm, TaskStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Tasklist CLI - keep a local to-do list")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the store directory (default: platform data directory)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Storage backend for the task snapshot
    #[arg(short, long, value_enum, default_value_t = Backend::Sqlite)]
    backend: Backend,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// Key/value table in tasklist.db
    Sqlite,
    /// One JSON file per key
    File,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks, optionally filtered by a case-insensitive search
    List {
        #[arg(short = 'q', long)]
        search: Option<String>,
    },

    /// Add a new task
    Add {
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Edit the task at INDEX
    Edit {
        index: usize,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete the task at INDEX
    Delete { index: usize },

    /// Print the raw persisted snapshot
    Export,
}

fn default_store_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("tasklist"))
        .ok_or_else(|| eyre!("Could not determine data directory, pass --store-path"))
}

fn open_backend(backend: Backend, path: &Path) -> Result<Box<dyn KvStore>> {
    let kv: Box<dyn KvStore> = match backend {
        Backend::Sqlite => Box::new(SqliteKv::open(path)?),
        Backend::File => Box::new(FileKv::open(path)?),
    };
    Ok(kv)
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let store_path = match cli.store_path {
        Some(path) => path,
        None => default_store_path()?,
    };

    // Open store
    let backend = open_backend(cli.backend, &store_path)?;
    let mut store = TaskStore::open(backend)?;

    store.subscribe(|event| {
        if let StoreEvent::StorageFailed { message } = event {
            eprintln!("{} {}", "warning: task list not saved:".yellow(), message);
        }
    });

    match cli.command {
        Commands::List { search } => {
            if let Some(query) = search {
                store.set_search_query(query);
            }
            let filter = SearchFilter::new(store.search_query());
            let entries = store.filtered_entries();
            if entries.is_empty() {
                println!("{}", "No tasks".dimmed());
            }
            for (index, task) in entries {
                let mut line = format!("{} {}", format!("[{}]", index).cyan(), task.name.bold());
                if !task.description.is_empty() {
                    line.push_str(&format!(" - {}", task.description));
                }
                if let Some(field) = filter.matched_field(task).filter(|_| !filter.is_empty()) {
                    line.push_str(&format!(" {}", format!("(matched {})", field).dimmed()));
                }
                println!("{}", line);
            }
        }
        Commands::Add { name, description } => {
            store.open_modal();
            store.set_form(TaskForm::new(name, description));
            report(store.submit());
        }
        Commands::Edit {
            index,
            name,
            description,
        } => {
            if !store.edit(index) {
                println!("{}", format!("No task at index {}", index).yellow());
                return Ok(());
            }
            if let Some(name) = name {
                store.set_form_name(name);
            }
            if let Some(description) = description {
                store.set_form_description(description);
            }
            let outcome = store.submit();
            if outcome == SubmitOutcome::Ignored {
                store.close_modal();
            }
            report(outcome);
        }
        Commands::Delete { index } => match store.delete(index) {
            Some(task) => println!("{} {}", "Deleted".green(), task.name),
            None => println!("{}", format!("No task at index {}", index).yellow()),
        },
        Commands::Export => {
            let raw = store.backend().get(store.storage_key())?;
            println!("{}", raw.unwrap_or_else(|| "[]".to_string()));
        }
    }

    Ok(())
}

fn report(outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Ignored => println!("{}", "Task name cannot be blank, nothing saved".yellow()),
        SubmitOutcome::Created(index) => println!("{} task [{}]", "Added".green(), index),
        SubmitOutcome::Replaced(index) => println!("{} task [{}]", "Updated".green(), index),
    }
}
