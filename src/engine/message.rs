use chrono::{DateTime, Utc};

use crate::task::{Task, TaskId};

/// Terminal input reduced to what the update loop cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Enter,
    Esc,
    Tab,
    BackTab,
    Backspace,
    Up,
    Down,
}

/// Fields echoed back from a successful task insert so the model can build
/// the task without a refetch.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedTask {
    pub id: TaskId,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything the update loop consumes, in arrival order.
///
/// Result variants identify their task by id, not by list position: by the
/// time a command resolves, the list may have changed underneath it.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Key(Key),
    TasksLoaded {
        active: bool,
        result: Result<Vec<Task>, String>,
    },
    TaskCreated {
        index: usize,
        result: Result<CreatedTask, String>,
    },
    SequenceWritten {
        result: Result<(), String>,
    },
    SummaryUpdated {
        id: TaskId,
        summary: String,
        updated_at: DateTime<Utc>,
        result: Result<(), String>,
    },
    ContextUpdated {
        id: TaskId,
        context: Option<String>,
        updated_at: DateTime<Utc>,
        result: Result<(), String>,
    },
    StatusChanged {
        id: TaskId,
        active: bool,
        updated_at: DateTime<Utc>,
        result: Result<(), String>,
    },
    TaskDeleted {
        id: TaskId,
        active: bool,
        result: Result<(), String>,
    },
    EditorClosed {
        id: TaskId,
        old_context: Option<String>,
        outcome: Result<String, String>,
        cleanup_warning: Option<String>,
    },
    UrlOpened {
        url: String,
        result: Result<(), String>,
    },
    UrlsOpened {
        result: Result<(), String>,
    },
    ContextCopied {
        result: Result<(), String>,
    },
}
