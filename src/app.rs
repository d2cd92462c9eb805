//! Application state - owns the task store and applies user intents
//!
//! Every mutating intent saves the whole store afterwards. A failed save
//! is reported in the status line and the in-memory change is kept.

use crate::config::Settings;
use crate::core::{
    cascade, layout_roots, outline, priority, Convention, Layout, LayoutMetrics, MoveDirection,
    NewTask, OutlineLine, Point, SortMode, TaskEdit, TaskId, TaskStore, ViewFilter, Zoom,
};
use crate::storage;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// How the visible roots are drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    Cards,
    Text,
}

impl DisplayMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Cards => Self::Text,
            Self::Text => Self::Cards,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cards => write!(f, "cards"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Delete awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: TaskId,
    /// Number of tasks the cascade will remove
    pub count: usize,
}

/// Application state
pub struct App {
    pub store: TaskStore,
    pub data_path: PathBuf,
    pub view: ViewFilter,
    pub sort: SortMode,
    pub zoom: Zoom,
    pub convention: Convention,
    pub metrics: LayoutMetrics,
    pub mode: DisplayMode,
    /// Index into the visible roots
    pub selected: usize,
    pub status: Option<String>,
    pub pending_delete: Option<PendingDelete>,
    /// Extra horizontal scroll of the flowchart, in layout units
    pub pan_x: f64,
    /// Root picked up by a mouse press, dropped on release
    drag: Option<TaskId>,
    pub should_quit: bool,
}

impl App {
    /// Create an app around an already loaded store
    pub fn new(store: TaskStore, settings: &Settings, data_path: PathBuf) -> Self {
        Self {
            store,
            data_path,
            view: settings.view,
            sort: settings.sort,
            zoom: settings.initial_zoom(),
            convention: settings.convention,
            metrics: settings.metrics,
            mode: DisplayMode::default(),
            selected: 0,
            status: None,
            pending_delete: None,
            pan_x: 0.0,
            drag: None,
            should_quit: false,
        }
    }

    /// Load the task file and create the app.
    ///
    /// An unreadable file starts an empty session with a warning.
    pub fn open(settings: &Settings, data_path: PathBuf) -> Self {
        match storage::load(&data_path) {
            Ok(store) => Self::new(store, settings, data_path),
            Err(e) => {
                log::warn!("Failed to load tasks: {}", e);
                let mut app = Self::new(TaskStore::new(), settings, data_path);
                app.status = Some(format!("Could not load tasks: {e}"));
                app
            }
        }
    }

    /// Persist the store. Returns whether the save succeeded.
    pub fn commit(&mut self) -> bool {
        match storage::save(&self.data_path, &self.store) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to save tasks: {}", e);
                self.status = Some(format!("Could not save tasks: {e}"));
                false
            }
        }
    }

    /// Resolve a full id or unique prefix
    pub fn resolve(&self, prefix: &str) -> Result<TaskId> {
        Ok(self.store.resolve(prefix)?)
    }

    pub fn create(&mut self, new: NewTask) -> Result<TaskId> {
        let id = self.store.create(new)?;
        self.commit();
        Ok(id)
    }

    pub fn edit(&mut self, id: &TaskId, edit: TaskEdit) -> Result<()> {
        self.store.edit(id, edit)?;
        self.commit();
        Ok(())
    }

    /// Flip completion on one task. Returns the new value.
    pub fn toggle_done(&mut self, id: &TaskId) -> Result<bool> {
        let done = self.store.toggle_done(id)?;
        self.commit();
        Ok(done)
    }

    /// Flip the stash flag on a task and everything reachable from it
    pub fn toggle_stash(&mut self, id: &TaskId) -> Result<bool> {
        let stashed = cascade::toggle_stash(&mut self.store, id)?;
        self.commit();
        Ok(stashed)
    }

    /// Delete a task and everything reachable from it
    pub fn delete(&mut self, id: &TaskId) -> Result<Vec<TaskId>> {
        let removed = cascade::delete_recursive(&mut self.store, id)?;
        self.commit();
        Ok(removed)
    }

    pub fn move_priority(&mut self, id: &TaskId, direction: MoveDirection) -> Result<bool> {
        let moved = priority::move_priority(&mut self.store, id, direction)?;
        if moved {
            self.commit();
        }
        Ok(moved)
    }

    pub fn swap(&mut self, dragged: &TaskId, target: &TaskId) -> Result<()> {
        priority::swap_priorities(&mut self.store, dragged, target)?;
        self.commit();
        Ok(())
    }

    /// Roots shown by the current view, in display order
    pub fn visible_roots(&self) -> Vec<TaskId> {
        self.store.roots(self.view, self.sort)
    }

    pub fn selected_root(&self) -> Option<TaskId> {
        self.visible_roots().into_iter().nth(self.selected)
    }

    /// Layout pass over the visible roots
    pub fn layout(&self) -> Layout {
        let margin = self.metrics.root_gap * self.zoom.value();
        layout_roots(
            &self.store,
            &self.visible_roots(),
            Point::new(margin, margin),
            self.convention,
            &self.metrics,
            self.zoom,
        )
    }

    /// Root currently being dragged with the mouse
    pub fn dragging(&self) -> Option<&TaskId> {
        self.drag.as_ref()
    }

    /// Mouse press at a layout point: pick up the root card under it
    pub fn press_at(&mut self, point: Point) {
        let layout = self.layout();
        let Some(id) = layout.hit_test(point) else {
            return;
        };
        if self.visible_roots().contains(id) {
            self.status = None;
            self.select(id);
            self.drag = Some(id.clone());
        }
    }

    /// Mouse release: drop the dragged root on the root card under `point`
    pub fn release_at(&mut self, point: Option<Point>) {
        let Some(dragged) = self.drag.take() else {
            return;
        };
        let layout = self.layout();
        let Some(target) = point.and_then(|p| layout.hit_test(p)).cloned() else {
            return;
        };
        if target == dragged {
            return;
        }
        let result = self.swap(&dragged, &target);
        self.report(result.map(|()| "Swapped priorities".to_string()));
        self.select(&dragged);
    }

    /// Scroll the flowchart sideways by one card width
    fn pan(&mut self, steps: f64) {
        let step = self.metrics.card_width * self.zoom.value();
        let limit = self.layout().bounds().map_or(0.0, |b| b.right());
        self.pan_x = (self.pan_x + steps * step).clamp(0.0, limit.max(0.0));
    }

    /// Text-mode outline of the visible roots
    pub fn outline(&self) -> Vec<Vec<OutlineLine>> {
        outline(&self.store, &self.visible_roots(), self.view)
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        if let Some(pending) = self.pending_delete.take() {
            if key.code == KeyCode::Char('y') {
                let result = self.delete(&pending.id);
                self.report(result.map(|removed| format!("Deleted {} task(s)", removed.len())));
                self.clamp_selection();
            } else {
                self.status = Some("Delete cancelled".to_string());
            }
            return;
        }

        self.status = None;
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.view = self.view.next();
                self.selected = 0;
            }
            KeyCode::Char('s') => {
                self.sort = self.sort.toggle();
                self.selected = 0;
            }
            KeyCode::Char('m') => self.mode = self.mode.toggle(),
            KeyCode::Char('c') => self.convention = self.convention.toggle(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom = self.zoom.zoom_in(),
            KeyCode::Char('-') => self.zoom = self.zoom.zoom_out(),
            KeyCode::Up if shift => self.swap_with_neighbour(-1),
            KeyCode::Down if shift => self.swap_with_neighbour(1),
            KeyCode::Left => self.pan(-1.0),
            KeyCode::Right => self.pan(1.0),
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected + 1 < self.visible_roots().len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('[') => self.move_selected(MoveDirection::Up),
            KeyCode::Char(']') => self.move_selected(MoveDirection::Down),
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_root() {
                    let result = self.toggle_done(&id);
                    self.report(result.map(|done| {
                        String::from(if done { "Marked done" } else { "Marked not done" })
                    }));
                    self.clamp_selection();
                }
            }
            KeyCode::Char('z') => {
                if let Some(id) = self.selected_root() {
                    let result = self.toggle_stash(&id);
                    self.report(result.map(|stashed| {
                        String::from(if stashed { "Stashed" } else { "Unstashed" })
                    }));
                    self.clamp_selection();
                }
            }
            KeyCode::Char('x') => {
                if let Some(id) = self.selected_root() {
                    let count = cascade::reachable(&self.store, &id).len();
                    self.status = Some(format!("Delete {count} task(s)? y to confirm"));
                    self.pending_delete = Some(PendingDelete { id, count });
                }
            }
            _ => {}
        }
    }

    fn move_selected(&mut self, direction: MoveDirection) {
        let Some(id) = self.selected_root() else {
            return;
        };
        match self.move_priority(&id, direction) {
            Ok(true) => self.select(&id),
            Ok(false) => self.status = Some("Already at the edge".to_string()),
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    /// Keyboard drag-and-drop: swap priorities with the adjacent root
    fn swap_with_neighbour(&mut self, offset: isize) {
        let roots = self.visible_roots();
        let Some(target) = self
            .selected
            .checked_add_signed(offset)
            .and_then(|i| roots.get(i))
        else {
            return;
        };
        let Some(dragged) = roots.get(self.selected) else {
            return;
        };
        let result = self.swap(dragged, target);
        self.report(result.map(|()| "Swapped priorities".to_string()));
        self.select(dragged);
    }

    fn select(&mut self, id: &TaskId) {
        if let Some(i) = self.visible_roots().iter().position(|r| r == id) {
            self.selected = i;
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_roots().len();
        self.selected = self.selected.min(count.saturating_sub(1));
    }

    /// Show an intent's outcome unless a save warning is already pending
    fn report(&mut self, result: Result<String>) {
        match result {
            Ok(message) => {
                let save_failed = self
                    .status
                    .as_deref()
                    .is_some_and(|s| s.starts_with("Could not save"));
                if !save_failed {
                    self.status = Some(message);
                }
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    /// Check if we should poll for input
    pub fn should_poll_input() -> Result<bool> {
        Ok(event::poll(Duration::from_millis(100))?)
    }

    /// Get the next terminal event
    pub fn read_event() -> Result<Event> {
        Ok(event::read()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_in(dir: &TempDir) -> App {
        App::open(&Settings::default(), dir.path().join("tasks.json"))
    }

    #[test]
    fn test_mutations_are_saved() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        let a = app.create(NewTask::new("Write report")).unwrap();
        app.toggle_done(&a).unwrap();

        let reloaded = storage::load(&app.data_path).unwrap();
        assert_eq!(reloaded, app.store);
        assert!(reloaded.get(&a).unwrap().completed);
    }

    #[test]
    fn test_save_failure_keeps_mutation() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be written as a file
        let mut app = App::new(TaskStore::new(), &Settings::default(), dir.path().to_path_buf());
        let id = app.create(NewTask::new("Still here")).unwrap();

        assert!(app.store.contains(&id));
        assert!(app
            .status
            .as_deref()
            .is_some_and(|s| s.starts_with("Could not save")));
    }

    #[test]
    fn test_unreadable_file_starts_empty_with_warning() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, "garbage").unwrap();

        let app = App::open(&Settings::default(), path);
        assert!(app.store.is_empty());
        assert!(app.status.is_some());
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        let a = app.create(NewTask::new("A")).unwrap();
        let b = app.store.add_subtask(&a, "B", "").unwrap();
        app.store.add_workflow_sibling(&b, "C", "").unwrap();

        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(
            app.pending_delete,
            Some(PendingDelete {
                id: a.clone(),
                count: 3
            })
        );
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.store.len(), 3);
        assert!(app.pending_delete.is_none());

        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Char('y')));
        assert!(app.store.is_empty());
        assert!(storage::load(&app.data_path).unwrap().is_empty());
    }

    #[test]
    fn test_view_and_display_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.view, ViewFilter::Completed);
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.sort, SortMode::Created);
        app.handle_key(key(KeyCode::Char('m')));
        assert_eq!(app.mode, DisplayMode::Text);
        app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(app.convention, Convention::A);
        app.handle_key(key(KeyCode::Char('+')));
        assert_eq!(app.zoom, Zoom::new(1.1));
        for _ in 0..20 {
            app.handle_key(key(KeyCode::Char('-')));
        }
        assert_eq!(app.zoom.value(), Zoom::MIN);
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_done_moves_root_between_views() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        let a = app.create(NewTask::new("A")).unwrap();
        let b = app.create(NewTask::new("B")).unwrap();

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(app.visible_roots(), vec![a]);
        assert_eq!(app.selected, 0);

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.visible_roots(), vec![b]);
    }

    #[test]
    fn test_stash_key_cascades() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        let a = app.create(NewTask::new("A")).unwrap();
        let b = app.store.add_subtask(&a, "B", "").unwrap();

        app.handle_key(key(KeyCode::Char('z')));
        assert!(app.store.get(&b).unwrap().stashed);
        assert!(app.visible_roots().is_empty());
    }

    #[test]
    fn test_priority_keys_follow_selection() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        let a = app.create(NewTask::new("A")).unwrap();
        let b = app.create(NewTask::new("B")).unwrap();
        let c = app.create(NewTask::new("C")).unwrap();

        app.selected = 2;
        app.handle_key(key(KeyCode::Char('[')));
        assert_eq!(app.visible_roots(), vec![a.clone(), c.clone(), b.clone()]);
        assert_eq!(app.selected, 1);

        app.handle_key(KeyEvent::new(KeyCode::Up, KeyModifiers::SHIFT));
        assert_eq!(app.visible_roots(), vec![c.clone(), a, b]);
        assert_eq!(app.selected, 0);
        assert_eq!(app.selected_root(), Some(c));
    }

    #[test]
    fn test_mouse_drag_swaps_roots() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        let a = app.create(NewTask::new("A")).unwrap();
        let b = app.create(NewTask::new("B")).unwrap();
        let c = app.create(NewTask::new("C")).unwrap();
        let sub = app.store.add_subtask(&a, "A1", "").unwrap();

        let layout = app.layout();
        let centre = |id: &TaskId| {
            let r = layout.rect(id).unwrap();
            Point::new(r.x + r.width / 2.0, r.y + r.height / 2.0)
        };

        app.press_at(centre(&c));
        assert_eq!(app.dragging(), Some(&c));
        assert_eq!(app.selected, 2);
        app.release_at(Some(centre(&a)));
        assert!(app.dragging().is_none());
        assert_eq!(app.visible_roots(), vec![c.clone(), b.clone(), a.clone()]);
        assert_eq!(app.selected, 0);
        assert_eq!(app.status.as_deref(), Some("Swapped priorities"));
        assert_eq!(storage::load(&app.data_path).unwrap(), app.store);

        // Subtask cards cannot be picked up, and drops on empty space do nothing
        let layout = app.layout();
        let r = layout.rect(&sub).unwrap();
        app.press_at(Point::new(r.x + 1.0, r.y + 1.0));
        assert!(app.dragging().is_none());

        app.press_at(centre(&b));
        app.release_at(Some(Point::new(-50.0, -50.0)));
        app.release_at(None);
        assert_eq!(app.visible_roots(), vec![c, b, a]);
    }

    #[test]
    fn test_drop_on_subtask_reports_error() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        let a = app.create(NewTask::new("A")).unwrap();
        let b = app.create(NewTask::new("B")).unwrap();
        let sub = app.store.add_subtask(&a, "A1", "").unwrap();

        let layout = app.layout();
        let rb = layout.rect(&b).unwrap();
        let rs = layout.rect(&sub).unwrap();
        app.press_at(Point::new(rb.x + 1.0, rb.y + 1.0));
        app.release_at(Some(Point::new(rs.x + 1.0, rs.y + 1.0)));
        assert!(app
            .status
            .as_deref()
            .is_some_and(|s| s.contains("not a root task")));
        assert_eq!(app.visible_roots(), vec![a, b]);
    }

    #[test]
    fn test_arrow_keys_pan_within_bounds() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        let a = app.create(NewTask::new("A")).unwrap();
        app.store.add_subtask(&a, "B", "").unwrap();

        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.pan_x, 0.0);
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.pan_x, 240.0);

        let right = app.layout().bounds().unwrap().right();
        for _ in 0..10 {
            app.handle_key(key(KeyCode::Right));
        }
        assert_eq!(app.pan_x, right);
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.pan_x, right - 240.0);
    }

    #[test]
    fn test_layout_and_outline_follow_view() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        let a = app.create(NewTask::new("A")).unwrap();
        app.store.add_subtask(&a, "B", "").unwrap();
        app.create(NewTask::new("Other")).unwrap();

        let layout = app.layout();
        assert_eq!(layout.len(), 3);
        let rect = layout.rect(&a).unwrap();
        assert_eq!((rect.x, rect.y), (40.0, 40.0));

        let blocks = app.outline();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0][1].text(), "└── B");
    }
}
