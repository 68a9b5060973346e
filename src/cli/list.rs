//! List command: print active summaries in priority order.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::Result;
use crate::output::{self, OutputOptions};
use crate::store::Store;
use crate::task::Task;

/// Options for list command
pub struct Options {
    pub limit: Option<usize>,
    pub capacity: usize,
    pub db_path: PathBuf,
    pub output: OutputOptions,
}

/// List output for JSON
#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub count: usize,
    pub tasks: Vec<Task>,
}

/// Run list command
pub fn run(opts: Options) -> Result<()> {
    let store = Store::open(&opts.db_path)?;
    let limit = opts.limit.unwrap_or(opts.capacity).min(opts.capacity);
    let tasks = store.fetch_active(limit)?;

    if opts.output.json {
        let data = ListOutput {
            count: tasks.len(),
            tasks,
        };
        return output::emit_success(opts.output, "list", &data, None);
    }

    if opts.output.quiet {
        return Ok(());
    }

    // Plain lines, nothing else; an empty list prints nothing.
    for task in &tasks {
        println!("{}", task.summary);
    }

    Ok(())
}
