//! Task store - flat id -> record map plus the two relation accessors
//!
//! Subtask and workflow relations live on the records themselves; the
//! accessors here are the only way to walk them.

use super::error::{TaskError, TaskResult};
use super::priority;
use super::task::{NewTask, Priority, SortMode, Task, TaskEdit, TaskId, ViewFilter};
use chrono::{Local, NaiveDateTime};
use std::collections::BTreeMap;

/// In-memory task store, owned by the application for the whole session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskStore {
    tasks: BTreeMap<TaskId, Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loaded records. The map key is authoritative for ids.
    pub fn from_tasks(tasks: BTreeMap<TaskId, Task>) -> Self {
        let tasks = tasks
            .into_iter()
            .map(|(key, mut task)| {
                if task.id != key {
                    if !task.id.is_empty() {
                        log::warn!("Task record id {} differs from key {}, using key", task.id, key);
                    }
                    task.id = key.clone();
                }
                (key, task)
            })
            .collect();
        Self { tasks }
    }

    pub fn tasks(&self) -> &BTreeMap<TaskId, Task> {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    pub(crate) fn require_mut(&mut self, id: &TaskId) -> TaskResult<&mut Task> {
        self.tasks
            .get_mut(id)
            .ok_or_else(|| TaskError::NotFound(id.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Insert a fully formed record as-is, replacing any record with the same id
    pub fn insert(&mut self, task: Task) {
        self.tasks.insert(task.id.clone(), task);
    }

    pub(crate) fn remove(&mut self, id: &TaskId) -> Option<Task> {
        self.tasks.remove(id)
    }

    /// Parent reference, or `None` when absent or dangling
    fn effective_parent<'a>(&self, task: &'a Task) -> Option<&'a TaskId> {
        task.parent_id.as_ref().filter(|id| self.tasks.contains_key(*id))
    }

    /// Workflow anchor reference, or `None` when absent or dangling
    fn effective_anchor<'a>(&self, task: &'a Task) -> Option<&'a TaskId> {
        task.workflow_sibling_of
            .as_ref()
            .filter(|id| self.tasks.contains_key(*id))
    }

    /// A root heads its own tree: no live parent and no live workflow anchor
    pub fn is_root(&self, id: &TaskId) -> bool {
        self.tasks.get(id).is_some_and(|task| {
            self.effective_parent(task).is_none() && self.effective_anchor(task).is_none()
        })
    }

    /// Direct subtasks of `parent_id`, by priority then creation order.
    ///
    /// Workflow siblings never appear here even when they share the parent.
    pub fn subtasks(&self, parent_id: &TaskId) -> Vec<TaskId> {
        let mut children: Vec<&Task> = self
            .tasks
            .values()
            .filter(|t| {
                self.effective_parent(t) == Some(parent_id) && self.effective_anchor(t).is_none()
            })
            .collect();
        children.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then(a.created.cmp(&b.created))
                .then(a.id.cmp(&b.id))
        });
        children.into_iter().map(|t| t.id.clone()).collect()
    }

    /// Direct workflow siblings of `task_id`, by creation order.
    ///
    /// Siblings of siblings are not included; callers recurse.
    pub fn workflow_siblings(&self, task_id: &TaskId) -> Vec<TaskId> {
        let mut siblings: Vec<&Task> = self
            .tasks
            .values()
            .filter(|t| t.workflow_sibling_of.as_ref() == Some(task_id))
            .collect();
        siblings.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        siblings.into_iter().map(|t| t.id.clone()).collect()
    }

    /// Root tasks shown by a view, in display order
    pub fn roots(&self, filter: ViewFilter, sort: SortMode) -> Vec<TaskId> {
        let mut roots: Vec<&Task> = self
            .tasks
            .values()
            .filter(|t| {
                self.effective_parent(t).is_none()
                    && self.effective_anchor(t).is_none()
                    && filter.matches(t)
            })
            .collect();
        match sort {
            SortMode::Priority => roots.sort_by(|a, b| {
                a.priority
                    .cmp(&b.priority)
                    .then(a.created.cmp(&b.created))
                    .then(a.id.cmp(&b.id))
            }),
            SortMode::Created => {
                roots.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)))
            }
        }
        roots.into_iter().map(|t| t.id.clone()).collect()
    }

    /// Resolve a full id or a unique id prefix
    pub fn resolve(&self, prefix: &str) -> TaskResult<TaskId> {
        let prefix = prefix.trim();
        let exact = TaskId::from(prefix);
        if self.tasks.contains_key(&exact) {
            return Ok(exact);
        }

        let matches: Vec<&TaskId> = if prefix.is_empty() {
            Vec::new()
        } else {
            self.tasks
                .keys()
                .filter(|id| id.as_str().starts_with(prefix))
                .collect()
        };

        match matches.as_slice() {
            [] => Err(TaskError::NotFound(exact)),
            [only] => Ok((*only).clone()),
            many => Err(TaskError::AmbiguousId {
                prefix: prefix.to_string(),
                matches: many.len(),
            }),
        }
    }

    /// Create a task from user input and insert it
    pub fn create(&mut self, new: NewTask) -> TaskResult<TaskId> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }

        let mut parent_id = new.parent_id;
        if let Some(anchor_id) = &new.workflow_sibling_of {
            let anchor = self
                .tasks
                .get(anchor_id)
                .ok_or_else(|| TaskError::NotFound(anchor_id.clone()))?;
            // Workflow siblings share their anchor's parent
            parent_id = anchor.parent_id.clone();
        } else if let Some(pid) = &parent_id {
            if !self.tasks.contains_key(pid) {
                return Err(TaskError::NotFound(pid.clone()));
            }
        }

        let task = Task {
            id: TaskId::generate(),
            title: title.to_string(),
            description: new.description.trim().to_string(),
            completed: false,
            stashed: false,
            parent_id,
            workflow_sibling_of: new.workflow_sibling_of,
            created: self.next_created(),
            priority: priority::next_priority(self),
        };
        let id = task.id.clone();
        log::info!("Created task {} ({})", id.short(), task.title);
        self.insert(task);
        Ok(id)
    }

    /// Create a subtask under `parent_id`
    pub fn add_subtask(
        &mut self,
        parent_id: &TaskId,
        title: &str,
        description: &str,
    ) -> TaskResult<TaskId> {
        self.create(NewTask {
            title: title.to_string(),
            description: description.to_string(),
            parent_id: Some(parent_id.clone()),
            workflow_sibling_of: None,
        })
    }

    /// Create a workflow continuation of `anchor_id`
    pub fn add_workflow_sibling(
        &mut self,
        anchor_id: &TaskId,
        title: &str,
        description: &str,
    ) -> TaskResult<TaskId> {
        self.create(NewTask {
            title: title.to_string(),
            description: description.to_string(),
            parent_id: None,
            workflow_sibling_of: Some(anchor_id.clone()),
        })
    }

    /// Apply an edit. An empty title rejects the whole edit.
    pub fn edit(&mut self, id: &TaskId, edit: TaskEdit) -> TaskResult<()> {
        if !self.tasks.contains_key(id) {
            return Err(TaskError::NotFound(id.clone()));
        }
        let title = match &edit.title {
            Some(title) if title.trim().is_empty() => return Err(TaskError::EmptyTitle),
            Some(title) => Some(title.trim().to_string()),
            None => None,
        };

        let task = self.require_mut(id)?;
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = edit.description {
            task.description = description.trim().to_string();
        }
        if let Some(input) = edit.priority {
            task.priority = Priority::parse_input(&input);
        }
        Ok(())
    }

    /// Set completion on a single task. Does not cascade.
    pub fn set_done(&mut self, id: &TaskId, done: bool) -> TaskResult<()> {
        self.require_mut(id)?.set_completed(done);
        Ok(())
    }

    /// Flip completion on a single task, returning the new value
    pub fn toggle_done(&mut self, id: &TaskId) -> TaskResult<bool> {
        let task = self.require_mut(id)?;
        let done = !task.completed;
        task.set_completed(done);
        Ok(done)
    }

    /// Creation timestamp strictly after every existing one
    fn next_created(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        match self.tasks.values().map(|t| t.created).max() {
            Some(latest) if latest >= now => latest + chrono::Duration::microseconds(1),
            _ => now,
        }
    }
}
