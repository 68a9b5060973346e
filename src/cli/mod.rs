//! Command-line interface for prio
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule; a bare positional
//! argument is treated as a quick-add summary, and no arguments at all
//! open the interactive list.

use clap::{Parser, Subcommand};

use chrono::Utc;
use serde::Serialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{self, HumanOutput, OutputOptions};
use crate::store::Store;
use crate::task::{self, TaskId};

mod import;
mod list;
mod show;

/// prio - a prioritized list of what matters next
///
/// A keyboard-driven task list with a persistent order. Run without
/// arguments for the interactive view, or pass a summary to add a task
/// at the top and exit.
#[derive(Parser, Debug)]
#[command(name = "prio")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the task database (defaults to the platform data dir)
    #[arg(long, global = true, env = "PRIO_DB")]
    pub db_path: Option<std::path::PathBuf>,

    /// Path to the config file (defaults to the platform config dir)
    #[arg(long, global = true, env = "PRIO_CONFIG")]
    pub config: Option<std::path::PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Task summary to add at the top of the list
    pub summary: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import tasks from stdin, one summary per line
    Import {
        /// Append imported tasks at the bottom instead of the top
        #[arg(long)]
        append: bool,
    },

    /// Print active task summaries in priority order
    List {
        /// Maximum number of tasks to print
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Print the full task at a 1-based list position
    Show {
        /// Position in the active list, as printed by `prio list`
        position: usize,
    },
}

/// Options for the quick-add path
pub struct AddOptions {
    pub summary: String,
    pub capacity: usize,
    pub db_path: std::path::PathBuf,
    pub output: OutputOptions,
}

/// Quick-add output for JSON
#[derive(Debug, Serialize)]
pub struct AddOutput {
    pub id: TaskId,
    pub summary: String,
    pub position: usize,
}

/// Add one task at the top of the list.
///
/// Overlong summaries are cut with an ellipsis rather than rejected, the
/// same treatment import gives arbitrary input lines.
fn run_add(opts: AddOptions) -> Result<()> {
    let summary = task::truncate_summary(&opts.summary);
    if summary.is_empty() {
        return Err(Error::InvalidSummary("summary cannot be empty".to_string()));
    }

    let mut store = Store::open(&opts.db_path)?;
    let active = store.num_active()?;
    if active + 1 > opts.capacity {
        return Err(Error::CapacityExceeded {
            count: active + 1,
            limit: opts.capacity,
        });
    }

    let now = Utc::now();
    let id = store.insert_task(&summary, now, now, true)?;

    let human = HumanOutput::new(format!("Added: {summary}"));
    let data = AddOutput {
        id,
        summary,
        position: 1,
    };
    output::emit_success(opts.output, "add", &data, Some(&human))
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let config = Config::load_or_default(self.config.as_deref())?;
        let db_path = config.resolve_db_path(self.db_path.as_deref())?;
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Some(Commands::Import { append }) => import::run(import::Options {
                append,
                capacity: config.capacity,
                db_path,
                output,
            }),
            Some(Commands::List { limit }) => list::run(list::Options {
                limit,
                capacity: config.capacity,
                db_path,
                output,
            }),
            Some(Commands::Show { position }) => show::run(show::Options {
                position,
                db_path,
                output,
            }),
            None => match self.summary {
                Some(summary) => run_add(AddOptions {
                    summary,
                    capacity: config.capacity,
                    db_path,
                    output,
                }),
                None => {
                    let store = Store::open(&db_path)?;
                    crate::ui::run(store, config)
                }
            },
        }
    }
}
