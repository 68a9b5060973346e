//! The transition function: one message in, model mutated, commands out.
//!
//! Mirrors the keyboard-driven flow of the interface. Structural operations
//! on the active list (insert, move, archive, delete) end with a full
//! sequence snapshot command; nothing is rolled back when a command later
//! fails, the error lands in the banner and the next operation writes a
//! fresh snapshot over whatever the store holds.

use crate::engine::command::Command;
use crate::engine::message::{CreatedTask, Key, Message};
use crate::engine::model::{Banner, EntryForm, EntryIntent, Model, Pane, View};
use crate::external;
use crate::sequence::{self, InsertPos};
use crate::task::{self, Task, TaskId};

const CAPACITY_MSG: &str = "Task list is at capacity. Archive or delete tasks with ctrl+d/ctrl+x.";
const FILTERED_ADD_MSG: &str = "Cannot add tasks while the list is filtered";
const FILTERED_MOVE_MSG: &str = "Cannot move tasks while the list is filtered";
const FILTERED_ARCHIVE_MSG: &str = "Cannot archive tasks while the list is filtered";
const FILTERED_DELETE_MSG: &str = "Cannot delete tasks while the list is filtered";

/// Apply one message and return the commands it provokes.
pub fn update(model: &mut Model, message: Message) -> Vec<Command> {
    // Whatever the last step reported does not outlive this one.
    model.banner = Banner::None;

    match message {
        Message::Key(key) => handle_key(model, key),
        Message::TasksLoaded { active, result } => on_tasks_loaded(model, active, result),
        Message::TaskCreated { index, result } => on_task_created(model, index, result),
        Message::SequenceWritten { result } => {
            if let Err(err) = result {
                model.banner = Banner::error(format!("Error writing sequence: {err}"));
            }
            Vec::new()
        }
        Message::SummaryUpdated {
            id,
            summary,
            updated_at,
            result,
        } => on_summary_updated(model, id, summary, updated_at, result),
        Message::ContextUpdated {
            id,
            context,
            updated_at,
            result,
        } => on_context_updated(model, id, context, updated_at, result),
        Message::StatusChanged {
            id,
            active,
            updated_at,
            result,
        } => on_status_changed(model, id, active, updated_at, result),
        Message::TaskDeleted { id, active, result } => on_task_deleted(model, id, active, result),
        Message::EditorClosed {
            id,
            old_context,
            outcome,
            cleanup_warning,
        } => on_editor_closed(model, id, old_context, outcome, cleanup_warning),
        Message::UrlOpened { url, result } => {
            if let Err(err) = result {
                model.banner = Banner::error(format!("Error opening {url}: {err}"));
            }
            Vec::new()
        }
        Message::UrlsOpened { result } => {
            if let Err(err) = result {
                model.banner = Banner::error(format!("Error opening bookmarks: {err}"));
            }
            Vec::new()
        }
        Message::ContextCopied { result } => {
            match result {
                Ok(()) => model.banner = Banner::info("Context copied to clipboard!"),
                Err(err) => {
                    model.banner =
                        Banner::error(format!("Couldn't copy context to clipboard: {err}"));
                }
            }
            Vec::new()
        }
    }
}

// =============================================================================
// Key handling
// =============================================================================

fn handle_key(model: &mut Model, key: Key) -> Vec<Command> {
    if model.view == View::EntryForm {
        return entry_key(model, key);
    }

    match key {
        Key::Char('Q') => {
            model.quit = true;
            Vec::new()
        }
        Key::Esc | Key::Char('q') | Key::Ctrl('c') => dismiss(model),
        Key::Char('?') => toggle_help(model),
        Key::Tab | Key::BackTab => switch_pane(model),
        Key::Char('I') => open_entry(model, InsertPos::Top),
        Key::Char('O') => open_entry(model, InsertPos::AtCursor),
        Key::Char('a') | Key::Char('o') => open_entry(model, InsertPos::AfterCursor),
        Key::Char('A') => open_entry(model, InsertPos::Bottom),
        Key::Char('j') | Key::Down => cursor_down(model),
        Key::Char('k') | Key::Up => cursor_up(model),
        Key::Char('J') => move_selected_down(model),
        Key::Char('K') => move_selected_up(model),
        Key::Enter => confirm(model),
        Key::Char('u') => start_rename(model),
        Key::Ctrl('r') => reload(model),
        Key::Ctrl('d') => toggle_status(model),
        Key::Ctrl('x') => delete_selected(model),
        Key::Ctrl('p') => open_prefix_picker(model),
        Key::Char('b') => open_bookmarks(model),
        Key::Char('B') => open_all_bookmarks(model),
        Key::Char('c') => edit_context(model),
        Key::Char('y') => copy_context(model),
        Key::Char('v') => toggle_density(model),
        Key::Char('C') => toggle_context_pane(model),
        Key::Char('d') => toggle_detail(model),
        Key::Char('h') => detail_prev(model),
        Key::Char('l') => detail_next(model),
        _ => Vec::new(),
    }
}

fn entry_key(model: &mut Model, key: Key) -> Vec<Command> {
    match key {
        Key::Esc | Key::Ctrl('c') => {
            close_entry(model);
            Vec::new()
        }
        Key::Enter => submit_entry(model),
        Key::Backspace => {
            model.entry.text.pop();
            Vec::new()
        }
        Key::Ctrl('u') => {
            model.entry.text.clear();
            Vec::new()
        }
        Key::Char(ch) if !ch.is_control() => {
            model.entry.text.push(ch);
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn close_entry(model: &mut Model) {
    model.view = View::ListActive;
    model.pane = Pane::Active;
}

fn submit_entry(model: &mut Model) -> Vec<Command> {
    let summary = match task::validate_summary(&model.entry.text) {
        Ok(summary) => summary,
        Err(err) => {
            // The form stays open so the input can be fixed in place.
            model.banner = Banner::error(err.to_string());
            return Vec::new();
        }
    };

    let intent = model.entry.intent;
    if let EntryIntent::Create { .. } = intent {
        // The list may have grown while the form was open (a reload or a
        // concurrent insert result), so capacity is checked again here.
        if model.active.len() >= model.capacity {
            model.banner = Banner::error(CAPACITY_MSG);
            return Vec::new();
        }
    }
    close_entry(model);
    match intent {
        EntryIntent::Create { index } => vec![Command::CreateTask { summary, index }],
        EntryIntent::Rename { id } => vec![Command::UpdateSummary { id, summary }],
    }
}

fn dismiss(model: &mut Model) -> Vec<Command> {
    match model.view {
        View::ListActive if model.filter_active.is_some() => {
            model.filter_active = None;
            model.clamp_cursor(Pane::Active);
        }
        View::ListArchived if model.filter_archived.is_some() => {
            model.filter_archived = None;
            model.clamp_cursor(Pane::Archived);
        }
        View::ListArchived => {
            model.last_view = View::ListArchived;
            model.view = View::ListActive;
            model.pane = Pane::Active;
        }
        View::DetailPane | View::BookmarkPicker | View::PrefixPicker | View::Help => {
            model.view = model.last_view;
            model.pane = match model.view {
                View::ListArchived => Pane::Archived,
                _ => Pane::Active,
            };
        }
        View::ListActive => model.quit = true,
        // Handled in entry_key.
        View::EntryForm => {}
    }
    Vec::new()
}

fn toggle_help(model: &mut Model) -> Vec<Command> {
    match model.view {
        View::DetailPane | View::BookmarkPicker | View::PrefixPicker => {}
        View::Help => model.view = model.last_view,
        _ => {
            model.last_view = model.view;
            model.view = View::Help;
        }
    }
    Vec::new()
}

fn switch_pane(model: &mut Model) -> Vec<Command> {
    match model.view {
        View::ListActive => {
            model.view = View::ListArchived;
            model.last_view = View::ListArchived;
            model.pane = Pane::Archived;
        }
        View::ListArchived => {
            model.view = View::ListActive;
            model.last_view = View::ListActive;
            model.pane = Pane::Active;
        }
        _ => {}
    }
    Vec::new()
}

fn open_entry(model: &mut Model, pos: InsertPos) -> Vec<Command> {
    if model.view != View::ListActive {
        return Vec::new();
    }
    if model.active.len() >= model.capacity {
        model.banner = Banner::error(CAPACITY_MSG);
        return Vec::new();
    }
    if model.is_filtered(Pane::Active) {
        model.banner = Banner::error(FILTERED_ADD_MSG);
        return Vec::new();
    }

    let index = sequence::resolve_insert_index(model.active.len(), model.cursor_active, pos);
    model.entry = EntryForm::create(index);
    model.view = View::EntryForm;
    Vec::new()
}

fn cursor_down(model: &mut Model) -> Vec<Command> {
    match model.view {
        View::ListActive | View::ListArchived => {
            let pane = model.pane;
            let cursor = model.cursor(pane);
            if cursor + 1 < model.visible_len(pane) {
                model.set_cursor(pane, cursor + 1);
            }
        }
        View::BookmarkPicker => model.bookmarks.down(),
        View::PrefixPicker => model.prefixes.down(),
        _ => {}
    }
    Vec::new()
}

fn cursor_up(model: &mut Model) -> Vec<Command> {
    match model.view {
        View::ListActive | View::ListArchived => {
            let pane = model.pane;
            let cursor = model.cursor(pane);
            model.set_cursor(pane, cursor.saturating_sub(1));
        }
        View::BookmarkPicker => model.bookmarks.up(),
        View::PrefixPicker => model.prefixes.up(),
        _ => {}
    }
    Vec::new()
}

fn move_selected_down(model: &mut Model) -> Vec<Command> {
    if model.view != View::ListActive {
        return Vec::new();
    }
    if model.is_filtered(Pane::Active) {
        model.banner = Banner::error(FILTERED_MOVE_MSG);
        return Vec::new();
    }
    let cursor = model.cursor_active;
    if model.active.is_empty() || cursor + 1 >= model.active.len() {
        return Vec::new();
    }

    model.cursor_active = model.active.move_down(cursor);
    vec![write_sequence(model)]
}

fn move_selected_up(model: &mut Model) -> Vec<Command> {
    if model.view != View::ListActive {
        return Vec::new();
    }
    if model.is_filtered(Pane::Active) {
        model.banner = Banner::error(FILTERED_MOVE_MSG);
        return Vec::new();
    }
    let cursor = model.cursor_active;
    if cursor == 0 || cursor >= model.active.len() {
        return Vec::new();
    }

    model.cursor_active = model.active.move_up(cursor);
    vec![write_sequence(model)]
}

fn confirm(model: &mut Model) -> Vec<Command> {
    match model.view {
        View::ListActive => {
            if model.active.is_empty() {
                return Vec::new();
            }
            if model.is_filtered(Pane::Active) {
                model.banner = Banner::error(FILTERED_MOVE_MSG);
                return Vec::new();
            }
            let cursor = model.cursor_active;
            if cursor == 0 {
                return Vec::new();
            }
            model.cursor_active = model.active.move_to_top(cursor);
            vec![write_sequence(model)]
        }
        View::BookmarkPicker => match model.bookmarks.selected() {
            Some(url) => vec![Command::OpenUrl {
                url: url.to_string(),
            }],
            None => Vec::new(),
        },
        View::PrefixPicker => apply_prefix_filter(model),
        _ => Vec::new(),
    }
}

fn apply_prefix_filter(model: &mut Model) -> Vec<Command> {
    let Some(prefix) = model.prefixes.selected().map(str::to_string) else {
        return Vec::new();
    };
    match model.pane {
        Pane::Active => {
            model.filter_active = Some(prefix);
            model.cursor_active = 0;
            model.view = View::ListActive;
        }
        Pane::Archived => {
            model.filter_archived = Some(prefix);
            model.cursor_archived = 0;
            model.view = View::ListArchived;
        }
    }
    Vec::new()
}

fn start_rename(model: &mut Model) -> Vec<Command> {
    if model.view != View::ListActive {
        return Vec::new();
    }
    let Some((id, summary)) = model
        .selected(Pane::Active)
        .map(|task| (task.id, task.summary.clone()))
    else {
        return Vec::new();
    };

    model.entry = EntryForm::rename(id, &summary);
    model.view = View::EntryForm;
    Vec::new()
}

fn reload(model: &mut Model) -> Vec<Command> {
    let pane = match model.view {
        View::ListActive => Pane::Active,
        View::ListArchived => Pane::Archived,
        _ => return Vec::new(),
    };
    if model.is_filtered(pane) {
        return Vec::new();
    }
    vec![
        Command::LoadTasks {
            active: true,
            limit: model.capacity,
        },
        Command::LoadTasks {
            active: false,
            limit: model.capacity,
        },
    ]
}

fn toggle_status(model: &mut Model) -> Vec<Command> {
    let pane = match model.view {
        View::ListActive => Pane::Active,
        View::ListArchived => Pane::Archived,
        _ => return Vec::new(),
    };
    if model.list(pane).is_empty() {
        return Vec::new();
    }
    if model.is_filtered(pane) {
        model.banner = Banner::error(FILTERED_ARCHIVE_MSG);
        return Vec::new();
    }
    let Some(task) = model.selected(pane) else {
        return Vec::new();
    };
    vec![Command::SetStatus {
        id: task.id,
        active: pane == Pane::Archived,
    }]
}

fn delete_selected(model: &mut Model) -> Vec<Command> {
    let pane = match model.view {
        View::ListActive => Pane::Active,
        View::ListArchived => Pane::Archived,
        _ => return Vec::new(),
    };
    if model.list(pane).is_empty() {
        return Vec::new();
    }
    if model.is_filtered(pane) {
        model.banner = Banner::error(FILTERED_DELETE_MSG);
        return Vec::new();
    }
    let Some(task) = model.selected(pane) else {
        return Vec::new();
    };
    vec![Command::DeleteTask {
        id: task.id,
        active: pane == Pane::Active,
    }]
}

fn open_prefix_picker(model: &mut Model) -> Vec<Command> {
    let pane = match model.view {
        View::ListActive => Pane::Active,
        View::ListArchived => Pane::Archived,
        _ => return Vec::new(),
    };
    let list = model.list(pane);
    if list.is_empty() {
        model.banner = Banner::error("No tasks in the list");
        return Vec::new();
    }

    let mut prefixes: Vec<String> = list
        .tasks()
        .iter()
        .filter_map(|task| task.prefix())
        .map(str::to_string)
        .collect();
    prefixes.sort();
    prefixes.dedup();

    if prefixes.is_empty() {
        model.banner = Banner::error("No prefixes in the task list");
        return Vec::new();
    }
    if prefixes.len() == 1 {
        model.banner = Banner::error("Only one unique prefix in the task list");
        return Vec::new();
    }

    model.prefixes.set(prefixes);
    model.last_view = model.view;
    model.view = View::PrefixPicker;
    Vec::new()
}

fn open_bookmarks(model: &mut Model) -> Vec<Command> {
    if !matches!(model.view, View::ListActive | View::ListArchived) {
        return Vec::new();
    }
    let urls = match model.selected(model.pane) {
        Some(task) => task_urls(task),
        None => return Vec::new(),
    };

    if urls.is_empty() {
        model.banner = Banner::error("No bookmarks for this task");
        return Vec::new();
    }
    if urls.len() == 1 {
        let mut urls = urls;
        return vec![Command::OpenUrl {
            url: urls.remove(0),
        }];
    }

    model.bookmarks.set(urls);
    model.last_view = model.view;
    model.view = View::BookmarkPicker;
    Vec::new()
}

fn open_all_bookmarks(model: &mut Model) -> Vec<Command> {
    if !matches!(
        model.view,
        View::ListActive | View::ListArchived | View::DetailPane
    ) {
        return Vec::new();
    }
    let urls = match model.selected(model.pane) {
        Some(task) => task_urls(task),
        None => return Vec::new(),
    };

    if urls.is_empty() {
        model.banner = Banner::error("No bookmarks for this task");
        return Vec::new();
    }
    if urls.len() == 1 {
        let mut urls = urls;
        return vec![Command::OpenUrl {
            url: urls.remove(0),
        }];
    }
    vec![Command::OpenUrls { urls }]
}

fn edit_context(model: &mut Model) -> Vec<Command> {
    if !matches!(
        model.view,
        View::ListActive | View::ListArchived | View::DetailPane
    ) {
        return Vec::new();
    }
    let Some(task) = model.selected(model.pane) else {
        return Vec::new();
    };
    vec![Command::OpenEditor {
        id: task.id,
        context: task.context.clone(),
    }]
}

fn copy_context(model: &mut Model) -> Vec<Command> {
    if !matches!(
        model.view,
        View::ListActive | View::ListArchived | View::DetailPane
    ) {
        return Vec::new();
    }
    let Some(task) = model.selected(model.pane) else {
        return Vec::new();
    };
    match &task.context {
        Some(context) => vec![Command::CopyToClipboard {
            text: context.clone(),
        }],
        None => {
            model.banner = Banner::error("There's no context to copy");
            Vec::new()
        }
    }
}

fn toggle_density(model: &mut Model) -> Vec<Command> {
    if matches!(model.view, View::ListActive | View::ListArchived) {
        model.density = model.density.toggled();
    }
    Vec::new()
}

fn toggle_context_pane(model: &mut Model) -> Vec<Command> {
    if matches!(model.view, View::ListActive | View::ListArchived) {
        model.show_context = !model.show_context;
    }
    Vec::new()
}

fn toggle_detail(model: &mut Model) -> Vec<Command> {
    if model.view == View::DetailPane {
        model.view = model.last_view;
        return Vec::new();
    }
    if !matches!(model.view, View::ListActive | View::ListArchived) {
        return Vec::new();
    }
    if model.selected(model.pane).is_none() {
        return Vec::new();
    }
    model.last_view = model.view;
    model.view = View::DetailPane;
    Vec::new()
}

fn detail_prev(model: &mut Model) -> Vec<Command> {
    if model.view == View::DetailPane {
        let pane = model.pane;
        let cursor = model.cursor(pane);
        model.set_cursor(pane, cursor.saturating_sub(1));
    }
    Vec::new()
}

fn detail_next(model: &mut Model) -> Vec<Command> {
    if model.view == View::DetailPane {
        let pane = model.pane;
        let cursor = model.cursor(pane);
        if cursor + 1 < model.visible_len(pane) {
            model.set_cursor(pane, cursor + 1);
        }
    }
    Vec::new()
}

fn task_urls(task: &Task) -> Vec<String> {
    let mut urls = external::extract_urls(&task.summary);
    if let Some(context) = &task.context {
        urls.extend(external::extract_urls(context));
    }
    urls
}

fn write_sequence(model: &Model) -> Command {
    Command::WriteSequence {
        ids: model.active.ids(),
    }
}

// =============================================================================
// Command results
// =============================================================================

fn on_tasks_loaded(
    model: &mut Model,
    active: bool,
    result: Result<Vec<Task>, String>,
) -> Vec<Command> {
    match result {
        Err(err) => model.banner = Banner::error(format!("Error fetching tasks: {err}")),
        Ok(tasks) => {
            if active {
                model.active.set(tasks);
                model.cursor_active = 0;
            } else {
                model.archived.set(tasks);
                model.cursor_archived = 0;
            }
        }
    }
    Vec::new()
}

fn on_task_created(
    model: &mut Model,
    index: usize,
    result: Result<CreatedTask, String>,
) -> Vec<Command> {
    let created = match result {
        Ok(created) => created,
        Err(err) => {
            model.banner = Banner::error(format!("Error creating task: {err}"));
            return Vec::new();
        }
    };

    let task = Task {
        id: created.id,
        summary: created.summary,
        context: None,
        active: true,
        created_at: created.created_at,
        updated_at: created.updated_at,
    };
    // The list may have shifted since the entry form was opened.
    let index = index.min(model.active.len());
    model.active.insert(index, task);
    model.cursor_active = index;
    vec![write_sequence(model)]
}

fn on_summary_updated(
    model: &mut Model,
    id: TaskId,
    summary: String,
    updated_at: chrono::DateTime<chrono::Utc>,
    result: Result<(), String>,
) -> Vec<Command> {
    if let Err(err) = result {
        model.banner = Banner::error(format!("Error updating task: {err}"));
        return Vec::new();
    }
    if let Some(pos) = model.active.position_of(id) {
        if let Some(task) = model.active.get_mut(pos) {
            task.summary = summary;
            task.updated_at = updated_at;
        }
    }
    Vec::new()
}

fn on_context_updated(
    model: &mut Model,
    id: TaskId,
    context: Option<String>,
    updated_at: chrono::DateTime<chrono::Utc>,
    result: Result<(), String>,
) -> Vec<Command> {
    if let Err(err) = result {
        model.banner = Banner::error(format!("Error updating task: {err}"));
        return Vec::new();
    }
    let task = match model.active.position_of(id) {
        Some(pos) => model.active.get_mut(pos),
        None => model
            .archived
            .position_of(id)
            .and_then(|pos| model.archived.get_mut(pos)),
    };
    if let Some(task) = task {
        task.context = context;
        task.updated_at = updated_at;
    }
    Vec::new()
}

fn on_status_changed(
    model: &mut Model,
    id: TaskId,
    active: bool,
    updated_at: chrono::DateTime<chrono::Utc>,
    result: Result<(), String>,
) -> Vec<Command> {
    if let Err(err) = result {
        model.banner = Banner::error(format!("Error changing task status: {err}"));
        return Vec::new();
    }

    if active {
        // Unarchived tasks come back at the top; the cursor follows the task
        // it was on, which is now one lower.
        let Some((_, mut task)) = model.archived.remove_by_id(id) else {
            return Vec::new();
        };
        task.active = true;
        task.updated_at = updated_at;
        model.active.insert(0, task);
        model.cursor_active = (model.cursor_active + 1).min(model.active.len().saturating_sub(1));
        model.clamp_cursor(Pane::Archived);
    } else {
        let Some((_, mut task)) = model.active.remove_by_id(id) else {
            return Vec::new();
        };
        task.active = false;
        task.updated_at = updated_at;
        model.archived.insert(0, task);
        model.clamp_cursor(Pane::Active);
    }
    vec![write_sequence(model)]
}

fn on_task_deleted(
    model: &mut Model,
    id: TaskId,
    active: bool,
    result: Result<(), String>,
) -> Vec<Command> {
    if let Err(err) = result {
        model.banner = Banner::error(format!("Error deleting task: {err}"));
        return Vec::new();
    }

    if active {
        if model.active.remove_by_id(id).is_some() {
            model.clamp_cursor(Pane::Active);
            return vec![write_sequence(model)];
        }
        Vec::new()
    } else {
        if model.archived.remove_by_id(id).is_some() {
            model.clamp_cursor(Pane::Archived);
        }
        Vec::new()
    }
}

fn on_editor_closed(
    model: &mut Model,
    id: TaskId,
    old_context: Option<String>,
    outcome: Result<String, String>,
    cleanup_warning: Option<String>,
) -> Vec<Command> {
    let content = match outcome {
        Ok(content) => content,
        Err(err) => {
            model.banner = Banner::error(format!("Editor failed: {err}"));
            return Vec::new();
        }
    };

    if let Some(warning) = cleanup_warning {
        model.banner = Banner::error(warning);
    }

    if let Err(err) = task::validate_context(&content) {
        model.banner = Banner::error(err.to_string());
        return Vec::new();
    }

    // Closing an empty editor over a task that had no context is a no-op,
    // not a clear.
    if content.is_empty() && old_context.is_none() {
        return Vec::new();
    }

    let context = if content.is_empty() {
        None
    } else {
        Some(content)
    };
    vec![Command::UpdateContext { id, context }]
}
