use std::collections::HashMap;

use crate::config::{Config, ListDensity};
use crate::sequence;
use crate::task::{Task, TaskId};

/// Which screen owns the next key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    ListActive,
    ListArchived,
    EntryForm,
    DetailPane,
    BookmarkPicker,
    PrefixPicker,
    Help,
}

/// The list a cursor-relative operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Active,
    Archived,
}

/// One-shot status line, replaced on every update step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Banner {
    #[default]
    None,
    Info(String),
    Error(String),
}

impl Banner {
    pub fn info(message: impl Into<String>) -> Self {
        Banner::Info(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Banner::Error(message.into())
    }
}

/// An ordered task list plus an id-to-position map.
///
/// The map lets late-arriving results find their task after the list has
/// shifted underneath them. It is rebuilt on every structural change; at the
/// list sizes involved that is cheaper than keeping it incrementally correct.
#[derive(Debug, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
    index: HashMap<TaskId, usize>,
}

impl TaskList {
    pub fn set(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.rebuild_index();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<&Task> {
        self.tasks.get(pos)
    }

    pub fn get_mut(&mut self, pos: usize) -> Option<&mut Task> {
        self.tasks.get_mut(pos)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn position_of(&self, id: TaskId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.id).collect()
    }

    /// Insert at `pos`, clamped to the list bounds.
    pub fn insert(&mut self, pos: usize, task: Task) {
        sequence::insert_at(&mut self.tasks, task, pos);
        self.rebuild_index();
    }

    pub fn remove(&mut self, pos: usize) -> Option<Task> {
        let removed = sequence::remove_at(&mut self.tasks, pos);
        if removed.is_some() {
            self.rebuild_index();
        }
        removed
    }

    pub fn remove_by_id(&mut self, id: TaskId) -> Option<(usize, Task)> {
        let pos = self.position_of(id)?;
        self.remove(pos).map(|task| (pos, task))
    }

    pub fn move_up(&mut self, pos: usize) -> usize {
        let cursor = sequence::move_up(&mut self.tasks, pos);
        self.rebuild_index();
        cursor
    }

    pub fn move_down(&mut self, pos: usize) -> usize {
        let cursor = sequence::move_down(&mut self.tasks, pos);
        self.rebuild_index();
        cursor
    }

    pub fn move_to_top(&mut self, pos: usize) -> usize {
        let cursor = sequence::move_to_top(&mut self.tasks, pos);
        self.rebuild_index();
        cursor
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .tasks
            .iter()
            .enumerate()
            .map(|(pos, task)| (task.id, pos))
            .collect();
    }
}

/// What submitting the entry form means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryIntent {
    Create { index: usize },
    Rename { id: TaskId },
}

/// Single-line input state for the entry form.
#[derive(Debug)]
pub struct EntryForm {
    pub text: String,
    pub intent: EntryIntent,
}

impl EntryForm {
    pub fn create(index: usize) -> Self {
        Self {
            text: String::new(),
            intent: EntryIntent::Create { index },
        }
    }

    pub fn rename(id: TaskId, current: &str) -> Self {
        Self {
            text: current.to_string(),
            intent: EntryIntent::Rename { id },
        }
    }
}

/// Cursor-backed list of plain strings, shared by the bookmark and prefix
/// pickers.
#[derive(Debug, Default)]
pub struct Picker {
    pub items: Vec<String>,
    pub cursor: usize,
}

impl Picker {
    pub fn set(&mut self, items: Vec<String>) {
        self.items = items;
        self.cursor = 0;
    }

    pub fn selected(&self) -> Option<&str> {
        self.items.get(self.cursor).map(|s| s.as_str())
    }

    pub fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
    }
}

/// The whole interactive state. Mutated only by [`update`].
///
/// [`update`]: super::update::update
#[derive(Debug)]
pub struct Model {
    pub view: View,
    pub last_view: View,
    pub pane: Pane,
    pub active: TaskList,
    pub archived: TaskList,
    pub cursor_active: usize,
    pub cursor_archived: usize,
    pub filter_active: Option<String>,
    pub filter_archived: Option<String>,
    pub entry: EntryForm,
    pub bookmarks: Picker,
    pub prefixes: Picker,
    pub banner: Banner,
    pub capacity: usize,
    pub density: ListDensity,
    pub show_context: bool,
    pub list_title: String,
    pub quit: bool,
}

impl Model {
    pub fn new(cfg: &Config) -> Self {
        Self {
            view: View::ListActive,
            last_view: View::ListActive,
            pane: Pane::Active,
            active: TaskList::default(),
            archived: TaskList::default(),
            cursor_active: 0,
            cursor_archived: 0,
            filter_active: None,
            filter_archived: None,
            entry: EntryForm::create(0),
            bookmarks: Picker::default(),
            prefixes: Picker::default(),
            banner: Banner::None,
            capacity: cfg.capacity,
            density: cfg.list_density,
            show_context: cfg.show_context,
            list_title: cfg.list_title.clone(),
            quit: false,
        }
    }

    pub fn list(&self, pane: Pane) -> &TaskList {
        match pane {
            Pane::Active => &self.active,
            Pane::Archived => &self.archived,
        }
    }

    pub fn list_mut(&mut self, pane: Pane) -> &mut TaskList {
        match pane {
            Pane::Active => &mut self.active,
            Pane::Archived => &mut self.archived,
        }
    }

    pub fn filter(&self, pane: Pane) -> Option<&str> {
        match pane {
            Pane::Active => self.filter_active.as_deref(),
            Pane::Archived => self.filter_archived.as_deref(),
        }
    }

    pub fn is_filtered(&self, pane: Pane) -> bool {
        self.filter(pane).is_some()
    }

    pub fn cursor(&self, pane: Pane) -> usize {
        match pane {
            Pane::Active => self.cursor_active,
            Pane::Archived => self.cursor_archived,
        }
    }

    pub fn set_cursor(&mut self, pane: Pane, cursor: usize) {
        match pane {
            Pane::Active => self.cursor_active = cursor,
            Pane::Archived => self.cursor_archived = cursor,
        }
    }

    /// Positions in the pane's full list that pass its filter, in order.
    /// Without a filter this is the identity mapping, so the cursor doubles
    /// as a full-list position.
    pub fn visible(&self, pane: Pane) -> Vec<usize> {
        let list = self.list(pane);
        match self.filter(pane) {
            None => (0..list.len()).collect(),
            Some(filter) => list
                .tasks()
                .iter()
                .enumerate()
                .filter(|(_, task)| task.prefix() == Some(filter))
                .map(|(pos, _)| pos)
                .collect(),
        }
    }

    pub fn visible_len(&self, pane: Pane) -> usize {
        self.visible(pane).len()
    }

    /// Full-list position of the pane's selection, if the pane shows
    /// anything.
    pub fn selected_position(&self, pane: Pane) -> Option<usize> {
        self.visible(pane).get(self.cursor(pane)).copied()
    }

    pub fn selected(&self, pane: Pane) -> Option<&Task> {
        self.selected_position(pane)
            .and_then(|pos| self.list(pane).get(pos))
    }

    /// Pull the cursor back inside the visible range after a removal or a
    /// filter change.
    pub fn clamp_cursor(&mut self, pane: Pane) {
        let len = self.visible_len(pane);
        let cursor = self.cursor(pane);
        let clamped = if len == 0 { 0 } else { cursor.min(len - 1) };
        self.set_cursor(pane, clamped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(id: TaskId, summary: &str) -> Task {
        let now = Utc::now();
        Task {
            id,
            summary: summary.to_string(),
            context: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn model_with(summaries: &[(TaskId, &str)]) -> Model {
        let mut model = Model::new(&Config::default());
        model
            .active
            .set(summaries.iter().map(|(id, s)| task(*id, s)).collect());
        model
    }

    #[test]
    fn index_map_tracks_positions_across_moves() {
        let mut list = TaskList::default();
        list.set(vec![task(1, "a"), task(2, "b"), task(3, "c")]);

        assert_eq!(list.position_of(2), Some(1));
        list.move_to_top(2);
        assert_eq!(list.position_of(3), Some(0));
        assert_eq!(list.position_of(1), Some(1));
        assert_eq!(list.position_of(2), Some(2));

        list.remove_by_id(1).expect("task 1 should be present");
        assert_eq!(list.position_of(1), None);
        assert_eq!(list.position_of(2), Some(1));
    }

    #[test]
    fn insert_clamps_out_of_range_position() {
        let mut list = TaskList::default();
        list.set(vec![task(1, "a")]);
        list.insert(99, task(2, "b"));
        assert_eq!(list.ids(), vec![1, 2]);
    }

    #[test]
    fn visible_is_identity_without_filter() {
        let model = model_with(&[(1, "a"), (2, "b")]);
        assert_eq!(model.visible(Pane::Active), vec![0, 1]);
    }

    #[test]
    fn visible_narrows_to_prefix_matches() {
        let mut model = model_with(&[(1, "home: dishes"), (2, "work: report"), (3, "home: plants")]);
        model.filter_active = Some("home".to_string());

        assert_eq!(model.visible(Pane::Active), vec![0, 2]);
        model.cursor_active = 1;
        let selected = model.selected(Pane::Active).expect("selection");
        assert_eq!(selected.id, 3);
    }

    #[test]
    fn clamp_cursor_handles_shrunken_list() {
        let mut model = model_with(&[(1, "a"), (2, "b"), (3, "c")]);
        model.cursor_active = 2;
        model.active.remove(2);
        model.clamp_cursor(Pane::Active);
        assert_eq!(model.cursor_active, 1);

        model.active.set(Vec::new());
        model.clamp_cursor(Pane::Active);
        assert_eq!(model.cursor_active, 0);
    }

    #[test]
    fn picker_cursor_stays_in_bounds() {
        let mut picker = Picker::default();
        picker.set(vec!["one".to_string(), "two".to_string()]);

        picker.up();
        assert_eq!(picker.cursor, 0);
        picker.down();
        picker.down();
        assert_eq!(picker.cursor, 1);
        assert_eq!(picker.selected(), Some("two"));
    }
}
