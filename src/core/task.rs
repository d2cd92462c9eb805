//! Task record - the single node type of the flowchart graph

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque task identifier (UUID v4 string)
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, enough to address a task from the CLI
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Task priority - lower value means higher precedence.
///
/// `null` or a missing value in the task file reads as [`Priority::NONE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<i64>", into = "i64")]
pub struct Priority(i64);

impl Priority {
    /// Reserved value meaning "no explicit priority"
    pub const SENTINEL: i64 = 999;
    pub const NONE: Priority = Priority(Self::SENTINEL);

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    pub fn is_sentinel(self) -> bool {
        self.0 == Self::SENTINEL
    }

    /// Parse user input from the edit path.
    ///
    /// Non-numeric input falls back to the sentinel; negatives clamp to 0.
    pub fn parse_input(input: &str) -> Self {
        match input.trim().parse::<i64>() {
            Ok(v) => Self(v.max(0)),
            Err(_) => Self::NONE,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<Option<i64>> for Priority {
    fn from(value: Option<i64>) -> Self {
        value.map(Self).unwrap_or(Self::NONE)
    }
}

impl From<Priority> for i64 {
    fn from(value: Priority) -> Self {
        value.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            write!(f, "-")
        } else {
            write!(f, "P{}", self.0)
        }
    }
}

/// A task record as persisted in the task file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub stashed: bool,
    #[serde(default)]
    pub parent_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_sibling_of: Option<TaskId>,
    pub created: NaiveDateTime,
    #[serde(default)]
    pub priority: Priority,
}

impl Task {
    /// Mark complete or incomplete. Completing clears the stash flag.
    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
        if completed {
            self.stashed = false;
        }
    }

    /// Stash or unstash. Stashing clears the completion flag.
    pub fn set_stashed(&mut self, stashed: bool) {
        self.stashed = stashed;
        if stashed {
            self.completed = false;
        }
    }

    pub fn status(&self) -> TaskStatus {
        if self.completed {
            TaskStatus::Done
        } else if self.stashed {
            TaskStatus::Stashed
        } else {
            TaskStatus::Active
        }
    }
}

/// Display status derived from the two status flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Active,
    Done,
    Stashed,
}

impl TaskStatus {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Active => "□",
            Self::Done => "✓",
            Self::Stashed => "⏸",
        }
    }
}

/// Which root tasks a view shows
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ViewFilter {
    #[default]
    Active,
    Completed,
    Stashed,
}

impl ViewFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::Active => !task.completed && !task.stashed,
            Self::Completed => task.completed,
            Self::Stashed => task.stashed,
        }
    }

    /// Next filter in tab order
    pub fn next(self) -> Self {
        match self {
            Self::Active => Self::Completed,
            Self::Completed => Self::Stashed,
            Self::Stashed => Self::Active,
        }
    }

    /// Message shown when a view has no roots
    pub fn empty_message(self) -> &'static str {
        match self {
            Self::Active => "No tasks yet. Add one with `flowtask add <TITLE>`.",
            Self::Completed => "No completed tasks yet.",
            Self::Stashed => "No stashed tasks yet.",
        }
    }
}

impl fmt::Display for ViewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "todo"),
            Self::Completed => write!(f, "done"),
            Self::Stashed => write!(f, "stash"),
        }
    }
}

/// Root ordering
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Priority first, then creation time
    #[default]
    Priority,
    /// Creation time only
    Created,
}

impl SortMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Priority => Self::Created,
            Self::Created => Self::Priority,
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Priority => write!(f, "priority"),
            Self::Created => write!(f, "date"),
        }
    }
}

/// Input for creating a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub parent_id: Option<TaskId>,
    pub workflow_sibling_of: Option<TaskId>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Partial update applied by the edit path. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Raw user input, parsed with [`Priority::parse_input`]
    pub priority: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        Task {
            id: TaskId::from("t1"),
            title: "Write report".to_string(),
            description: String::new(),
            completed: false,
            stashed: false,
            parent_id: None,
            workflow_sibling_of: None,
            created: chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            priority: Priority::NONE,
        }
    }

    #[test]
    fn test_priority_parse_input() {
        assert_eq!(Priority::parse_input("3"), Priority::new(3));
        assert_eq!(Priority::parse_input(" 12 "), Priority::new(12));
        assert_eq!(Priority::parse_input("-4"), Priority::new(0));
        assert_eq!(Priority::parse_input("high"), Priority::NONE);
        assert_eq!(Priority::parse_input(""), Priority::NONE);
    }

    #[test]
    fn test_completed_and_stashed_are_exclusive() {
        let mut task = sample();
        task.set_stashed(true);
        task.set_completed(true);
        assert!(task.completed);
        assert!(!task.stashed);

        task.set_stashed(true);
        assert!(task.stashed);
        assert!(!task.completed);
        assert_eq!(task.status(), TaskStatus::Stashed);
    }

    #[test]
    fn test_record_reads_legacy_fields() {
        let json = r#"{
            "id": "abc",
            "title": "Legacy",
            "completed": true,
            "parent_id": null,
            "created": "2024-01-05T10:20:30.123456",
            "priority": null
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, Priority::NONE);
        assert!(task.completed);
        assert!(!task.stashed);
        assert!(task.workflow_sibling_of.is_none());
        assert_eq!(task.description, "");
    }

    #[test]
    fn test_record_omits_absent_workflow_link() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"parent_id\":null"));
        assert!(!json.contains("workflow_sibling_of"));
        assert!(json.contains("\"priority\":999"));
    }

    #[test]
    fn test_view_filter_matches() {
        let mut task = sample();
        assert!(ViewFilter::Active.matches(&task));
        task.set_completed(true);
        assert!(ViewFilter::Completed.matches(&task));
        assert!(!ViewFilter::Active.matches(&task));
        task.set_stashed(true);
        assert!(ViewFilter::Stashed.matches(&task));
        assert!(!ViewFilter::Completed.matches(&task));
    }
}
