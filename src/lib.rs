//! prio - Prioritized Task List Library
//!
//! This library provides the core functionality for the prio CLI tool,
//! a terminal task list built around one idea: the order of the list is
//! the priority, and it survives restarts exactly as you left it.
//!
//! # Core Concepts
//!
//! - **Tasks**: A short summary plus optional free-form context notes
//! - **Sequence**: A single persisted snapshot of the active task order
//! - **Prefixes**: `prefix: summary` conventions for grouping and filtering
//! - **Engine**: A message/command state machine behind the terminal UI
//! - **Capacity**: A hard cap on active tasks to keep the list honest
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `prio.toml`
//! - `engine`: Update loop, messages, commands, and the in-memory model
//! - `error`: Error types and result aliases
//! - `external`: Editor, browser, and clipboard integration
//! - `migrations`: SQLite schema versioning
//! - `output`: Human and JSON output envelopes
//! - `sequence`: Task order snapshots and reconciliation
//! - `store`: SQLite-backed task storage
//! - `task`: Task records and summary/context validation
//! - `ui`: Terminal interface built on ratatui

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod external;
pub mod migrations;
pub mod output;
pub mod sequence;
pub mod store;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
