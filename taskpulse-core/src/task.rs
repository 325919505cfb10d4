//! Task model shared by the prioritizer and the analyzer.
//!
//! Tasks are owned by the caller (store, UI). Nothing in this crate mutates
//! one; the builders below exist for collaborators and tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Parse a wire label. Case-insensitive; accepts `in-progress` as well.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "todo" => Some(TaskStatus::Todo),
            "in_progress" | "in-progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

/// Ordinal urgency tag. Declaration order is rank order: `Urgent` sorts first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent = 0,
    High = 1,
    Medium = 2,
    /// Also the fallback for unrecognized labels.
    #[default]
    Low = 3,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Urgent,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "urgent" => Some(Priority::Urgent),
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Importance weight used by the analyzer's priority mix (0.0..=1.0).
    pub fn weight(&self) -> f64 {
        match self {
            Priority::Urgent => 1.0,
            Priority::High => 0.7,
            Priority::Medium => 0.3,
            Priority::Low => 0.0,
        }
    }

    /// `high` or `urgent`.
    pub fn is_important(&self) -> bool {
        matches!(self, Priority::Urgent | Priority::High)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,

    pub priority: Priority,
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Set once, when the status becomes `Completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            priority: Priority::Medium,
            status: TaskStatus::Todo,
            due_date: None,
            estimated_minutes: None,
            created_at: None,
            updated_at: None,
            completed_at: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Zero is not a valid estimate and is dropped.
    pub fn with_estimate(mut self, minutes: u32) -> Self {
        self.estimated_minutes = (minutes > 0).then_some(minutes);
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self.updated_at = Some(at);
        self
    }

    /// Mark completed at `at`. Keeps an earlier completion time if one exists.
    pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(self.completed_at.unwrap_or(at));
        self.updated_at = Some(at);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// `completed_at` is present iff the task is completed.
    pub fn is_consistent(&self) -> bool {
        self.completed_at.is_some() == self.is_completed()
    }

    /// Completed after its due date.
    pub fn finished_late(&self) -> bool {
        match (self.completed_at, self.due_date) {
            (Some(done), Some(due)) => done > due,
            _ => false,
        }
    }
}
