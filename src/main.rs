use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use std::path::PathBuf;
use todostore::{Checkpoint, ListSession, Store};

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "ToDoStore CLI - a durable to-do list")]
#[command(version)]
struct Cli {
    /// Path to the store directory (default: platform data directory)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show all to-dos
    List {
        /// Emit the list as JSON instead of formatted rows
        #[arg(long)]
        json: bool,
    },

    /// Add a new to-do
    Add {
        /// The to-do text; leading and trailing whitespace is trimmed
        text: String,
    },

    /// Toggle completion of the to-do at the given row number (as shown by `list`)
    Toggle {
        row: usize,
    },
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let store_path = match cli.store_path {
        Some(path) => path,
        None => default_store_path()?,
    };

    // Open store and load the list
    let store = Store::open(&store_path)?;
    let mut session = ListSession::open(store)?;

    match cli.command {
        Commands::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(session.todos())?);
            } else if session.is_empty() {
                println!("No to-dos yet. Add one with `todostore add <text>`.");
            } else {
                print_rows(&session);
            }
        }
        Commands::Add { text } => match session.add(&text)? {
            Some(_) => {
                print_rows(&session);
            }
            None => {
                println!("Nothing to add: the text was empty.");
            }
        },
        Commands::Toggle { row } => {
            if row == 0 || row > session.len() {
                return Err(eyre!(
                    "Row {} does not exist (the list has {} rows)",
                    row,
                    session.len()
                ));
            }
            session.toggle(row - 1)?;

            // The process exits right after this command
            session.checkpoint(Checkpoint::Terminate)?;
            print_rows(&session);
        }
    }

    Ok(())
}

fn print_rows(session: &ListSession) {
    for (i, todo) in session.todos().iter().enumerate() {
        let mark = if todo.is_complete {
            "✓".green().bold()
        } else {
            " ".normal()
        };
        let created = Local
            .timestamp_millis_opt(todo.created_at)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{:>3} [{}] {}  {}",
            i + 1,
            mark,
            todo.description,
            created.dimmed()
        );
    }
}

fn default_store_path() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .ok_or_else(|| eyre!("Could not determine a data directory; pass --store-path"))?;
    Ok(base.join("todostore"))
}
