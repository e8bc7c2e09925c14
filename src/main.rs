use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use todo::commands::create::NewTask;
use todo::input::{self, date_arg, effort_arg};
use todo::model::TaskPatch;
use todo::output::Format;
use todo::store::paths;

#[derive(Parser)]
#[command(name = "todo", version, about = "Personal task tracker")]
struct Cli {
    /// Path to the task database
    #[arg(long, global = true, env = "TODO_DB")]
    db: Option<PathBuf>,
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    format: Format,
    /// Diagnostic log level written to stderr
    #[arg(long, global = true, env = "TODO_LOG", default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
        /// Due date: today, tomorrow, yesterday or YYYY-MM-DD (default: today)
        #[arg(long, value_parser = date_arg)]
        due: Option<NaiveDate>,
        /// Tags, comma-separated or repeated (a leading # is dropped)
        #[arg(long)]
        tag: Vec<String>,
        /// Effort in hours
        #[arg(long, value_parser = effort_arg, allow_negative_numbers = true)]
        effort: Option<f64>,
        /// Create the task already completed
        #[arg(long)]
        done: bool,
    },
    /// List pending tasks, all tasks, or the tasks due on a date
    List {
        /// pending (default), all, or a date
        selector: Option<String>,
    },
    /// Display a single task
    Show {
        /// List label or task id
        reference: String,
    },
    /// Mark a task done
    Done {
        /// List label or task id
        reference: String,
    },
    /// Mark a task not done
    Undo {
        /// List label or task id
        reference: String,
    },
    /// Move a task to another due date
    Due {
        /// List label or task id
        reference: String,
        /// New due date
        #[arg(value_parser = date_arg)]
        date: NaiveDate,
    },
    /// Replace a task's tags
    Tag {
        /// List label or task id
        reference: String,
        /// New tags; none clears them
        tags: Vec<String>,
    },
    /// Set a task's effort in hours
    Effort {
        /// List label or task id
        reference: String,
        #[arg(value_parser = effort_arg, allow_negative_numbers = true)]
        hours: f64,
    },
    /// Delete a task
    Delete {
        /// List label or task id
        reference: String,
    },
    /// Rewrite several fields of a task at once
    Update {
        /// List label or task id
        reference: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New due date
        #[arg(long, value_parser = date_arg)]
        due: Option<NaiveDate>,
        /// Replace tags (repeatable)
        #[arg(long)]
        tag: Option<Vec<String>>,
        /// New effort in hours
        #[arg(long, value_parser = effort_arg, allow_negative_numbers = true)]
        effort: Option<f64>,
        /// Mark done
        #[arg(long, conflicts_with = "pending")]
        done: bool,
        /// Mark not done
        #[arg(long)]
        pending: bool,
    },
    /// Check that the indexes agree with the stored tasks
    Doctor,
    /// Rebuild the indexes from the stored tasks
    Reindex,
}

fn run(cli: Cli, format: Format) -> todo::error::Result<()> {
    let db_path = match cli.db {
        Some(path) => path,
        None => paths::default_db_path()?,
    };
    paths::ensure_parent_dir(&db_path)?;
    let db = db_path.as_path();

    match cli.command {
        None => todo::commands::list::run(db, None, format),
        Some(Commands::List { selector }) => {
            todo::commands::list::run(db, selector.as_deref(), format)
        }
        Some(Commands::Add {
            title,
            due,
            tag,
            effort,
            done,
        }) => todo::commands::create::run(
            db,
            NewTask {
                words: title,
                due,
                tags: tag,
                effort,
                done,
            },
            format,
        ),
        Some(Commands::Show { reference }) => todo::commands::show::run(db, &reference, format),
        Some(Commands::Done { reference }) => {
            todo::commands::lifecycle::done(db, &reference, format)
        }
        Some(Commands::Undo { reference }) => {
            todo::commands::lifecycle::undo(db, &reference, format)
        }
        Some(Commands::Due { reference, date }) => {
            todo::commands::edit::due(db, &reference, date, format)
        }
        Some(Commands::Tag { reference, tags }) => {
            todo::commands::edit::tags(db, &reference, &tags, format)
        }
        Some(Commands::Effort { reference, hours }) => {
            todo::commands::edit::effort(db, &reference, hours, format)
        }
        Some(Commands::Delete { reference }) => {
            todo::commands::delete::run(db, &reference, format)
        }
        Some(Commands::Update {
            reference,
            title,
            due,
            tag,
            effort,
            done,
            pending,
        }) => {
            let patch = TaskPatch {
                title: title.map(|t| input::title_from_words(&[t])),
                done: if done {
                    Some(true)
                } else if pending {
                    Some(false)
                } else {
                    None
                },
                due,
                tags: tag.map(|tags| tags.iter().flat_map(|t| input::parse_tags(t)).collect()),
                effort,
            };
            todo::commands::edit::update(db, &reference, patch, format)
        }
        Some(Commands::Doctor) => todo::commands::doctor::run(db, format),
        Some(Commands::Reindex) => todo::commands::reindex::run(db),
    }
}

fn main() {
    let cli = Cli::parse();
    let format = cli.format;
    let _logger = match todo::logging::init(&cli.log_level) {
        Ok(handle) => Some(handle),
        Err(message) => {
            eprintln!("warning: {message}");
            None
        }
    };

    if let Err(e) = run(cli, format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            Format::Pretty => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
