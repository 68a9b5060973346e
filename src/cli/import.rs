//! Import command: bulk-add task summaries from stdin.

use std::io::BufRead;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::output::{self, HumanOutput, OutputOptions};
use crate::store::Store;
use crate::task::{self, TaskId};

/// Options for import command
pub struct Options {
    pub append: bool,
    pub capacity: usize,
    pub db_path: PathBuf,
    pub output: OutputOptions,
}

/// Import output for JSON
#[derive(Debug, Serialize)]
pub struct ImportOutput {
    pub imported: usize,
    pub truncated: usize,
    pub placement: &'static str,
    pub ids: Vec<TaskId>,
}

/// Run import command
pub fn run(opts: Options) -> Result<()> {
    let stdin = std::io::stdin();
    let (summaries, truncated) = read_summaries(stdin.lock())?;
    run_with(summaries, truncated, opts)
}

fn run_with(summaries: Vec<String>, truncated: usize, opts: Options) -> Result<()> {
    if summaries.is_empty() {
        return Err(Error::InvalidArgument("nothing to import".to_string()));
    }

    let mut store = Store::open(&opts.db_path)?;
    let active = store.num_active()?;
    if active + summaries.len() > opts.capacity {
        return Err(Error::CapacityExceeded {
            count: active + summaries.len(),
            limit: opts.capacity,
        });
    }

    let now = Utc::now();
    let ids = store.insert_batch(&summaries, now, !opts.append)?;

    let placement = if opts.append { "bottom" } else { "top" };
    let mut human = HumanOutput::new(format!(
        "Imported {} task{}",
        ids.len(),
        if ids.len() == 1 { "" } else { "s" }
    ));
    human.push_summary("placement", placement);
    if truncated > 0 {
        human.push_warning(format!(
            "{truncated} summar{} longer than {} characters cut with an ellipsis",
            if truncated == 1 { "y was" } else { "ies were" },
            task::SUMMARY_MAX_CHARS
        ));
    }

    let data = ImportOutput {
        imported: ids.len(),
        truncated,
        placement,
        ids,
    };
    output::emit_success(opts.output, "import", &data, Some(&human))
}

/// Read summaries line by line: trim, skip blanks, cut overlong lines.
fn read_summaries(reader: impl BufRead) -> Result<(Vec<String>, usize)> {
    let mut summaries = Vec::new();
    let mut truncated = 0;

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.chars().count() > task::SUMMARY_MAX_CHARS {
            truncated += 1;
        }
        summaries.push(task::truncate_summary(trimmed));
    }

    Ok((summaries, truncated))
}
