//! Show command: print the full task at a 1-based list position.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::output::{self, OutputOptions};
use crate::store::Store;

/// Options for show command
pub struct Options {
    pub position: usize,
    pub db_path: PathBuf,
    pub output: OutputOptions,
}

/// Run show command
pub fn run(opts: Options) -> Result<()> {
    if opts.position == 0 {
        return Err(Error::NoTaskAtPosition(0));
    }

    let store = Store::open(&opts.db_path)?;
    let task = store
        .fetch_active_at(opts.position - 1)?
        .ok_or(Error::NoTaskAtPosition(opts.position))?;

    if opts.output.json {
        return output::emit_success(opts.output, "show", &task, None);
    }

    if opts.output.quiet {
        return Ok(());
    }

    println!("{}", task.summary);
    if let Some(context) = task.context.as_deref() {
        if !context.is_empty() {
            println!();
            println!("{context}");
        }
    }

    Ok(())
}
