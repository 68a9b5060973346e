use crate::task::TaskId;

/// Side effects requested by the update loop.
///
/// Every command runs to completion once issued; there is no cancellation and
/// no rollback of model state if one fails. Failures come back as error
/// results on the corresponding message.
///
/// [`Command::OpenEditor`] is the one exception to worker execution: it needs
/// the terminal, so the runtime intercepts it, suspends the interface, and
/// feeds the outcome back as [`Message::EditorClosed`].
///
/// [`Message::EditorClosed`]: super::Message::EditorClosed
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadTasks { active: bool, limit: usize },
    CreateTask { summary: String, index: usize },
    WriteSequence { ids: Vec<TaskId> },
    UpdateSummary { id: TaskId, summary: String },
    UpdateContext { id: TaskId, context: Option<String> },
    SetStatus { id: TaskId, active: bool },
    DeleteTask { id: TaskId, active: bool },
    OpenEditor { id: TaskId, context: Option<String> },
    OpenUrl { url: String },
    OpenUrls { urls: Vec<String> },
    CopyToClipboard { text: String },
}
