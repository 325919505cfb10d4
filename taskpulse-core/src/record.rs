//! Boundary normalization: loosely-typed task records into [`Task`].
//!
//! Records arrive from stores, files and UIs with missing or malformed
//! fields. A bad field never fails the batch: it is replaced with a safe
//! default and reported as a [`Degradation`]. An element that is not an
//! object at all becomes a placeholder task. Only input that is not a
//! collection of records is rejected.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value};

use crate::error::{EngineError, Result};
use crate::task::{Priority, Task, TaskStatus};
use crate::time::parse_due_date;

/// One field-level repair applied while normalizing a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    MissingId,
    MissingTitle,
    MissingPriority,
    UnknownPriority(String),
    UnknownStatus(String),
    MalformedDueDate(String),
    MalformedEstimate(String),
    MalformedTimestamp { field: &'static str, raw: String },
    /// `completed` without a `completedAt`.
    MissingCompletedAt,
    /// `completedAt` on a task that is not completed; the timestamp is dropped.
    UnexpectedCompletedAt,
    /// The array element was `null`, a number, etc. Holds its JSON kind.
    NotAnObject(&'static str),
}

impl Degradation {
    /// Whether the record's priority is a guess rather than data.
    pub fn affects_priority(&self) -> bool {
        matches!(
            self,
            Degradation::MissingPriority
                | Degradation::UnknownPriority(_)
                | Degradation::NotAnObject(_)
        )
    }
}

/// A normalized task plus the repairs it needed.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTask {
    pub task: Task,
    pub degradations: Vec<Degradation>,
}

impl NormalizedTask {
    pub fn is_clean(&self) -> bool {
        self.degradations.is_empty()
    }

    pub fn priority_known(&self) -> bool {
        !self.degradations.iter().any(Degradation::affects_priority)
    }

    /// Eligible for the analyzer's priority-mix weighting.
    pub fn is_weighted(&self) -> bool {
        self.priority_known() && self.task.completed_at.is_some()
    }
}

/// Normalize a JSON array of task records.
///
/// Fails with [`EngineError::InvalidArgument`] only when `value` is not an
/// array. Non-object elements become `record-<index>` placeholders.
pub fn normalize_records(value: &Value, tz: Tz) -> Result<Vec<NormalizedTask>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => {
            return Err(EngineError::InvalidArgument(
                "expected an array of task records, got null".to_string(),
            ));
        }
        other => {
            return Err(EngineError::InvalidArgument(format!(
                "expected an array of task records, got {}",
                json_kind(other)
            )));
        }
    };

    Ok(items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => normalize_record(index, fields, tz),
            other => placeholder(index, other),
        })
        .collect())
}

/// Stand-in for an element that is not a record. Open, low priority and
/// excluded from the priority mix.
fn placeholder(index: usize, item: &Value) -> NormalizedTask {
    let kind = json_kind(item);
    tracing::debug!(index, kind, "task record is not an object, using placeholder");
    NormalizedTask {
        task: Task::new(format!("record-{index}"), "(untitled)").with_priority(Priority::Low),
        degradations: vec![Degradation::NotAnObject(kind)],
    }
}

/// Normalize a single record object. Never fails.
///
/// `index` seeds a placeholder id (`record-<index>`) when the record has none.
pub fn normalize_record(index: usize, fields: &Map<String, Value>, tz: Tz) -> NormalizedTask {
    let mut degradations = Vec::new();

    let id = match fields.get("id").and_then(scalar_text) {
        Some(id) if !id.is_empty() => id,
        _ => {
            degradations.push(Degradation::MissingId);
            format!("record-{index}")
        }
    };

    let title = match fields.get("title").and_then(Value::as_str).map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            degradations.push(Degradation::MissingTitle);
            "(untitled)".to_string()
        }
    };

    let priority = match present(fields, "priority") {
        None => {
            degradations.push(Degradation::MissingPriority);
            Priority::default()
        }
        Some(v) => match v.as_str().and_then(Priority::from_label) {
            Some(p) => p,
            None => {
                degradations.push(Degradation::UnknownPriority(raw_text(v)));
                Priority::default()
            }
        },
    };

    let mut status = match present(fields, "status") {
        None => TaskStatus::Todo,
        Some(v) => match v.as_str().and_then(TaskStatus::from_label) {
            Some(s) => s,
            None => {
                degradations.push(Degradation::UnknownStatus(raw_text(v)));
                TaskStatus::Todo
            }
        },
    };

    let due_date = present(fields, "dueDate").and_then(|v| {
        let parsed = v.as_str().and_then(|s| parse_due_date(s, tz));
        if parsed.is_none() {
            degradations.push(Degradation::MalformedDueDate(raw_text(v)));
        }
        parsed
    });

    let estimated_minutes = present(fields, "estimatedMinutes").and_then(|v| {
        let parsed = estimate_minutes(v);
        if parsed.is_none() {
            degradations.push(Degradation::MalformedEstimate(raw_text(v)));
        }
        parsed
    });

    let created_at = timestamp(fields, "createdAt", &mut degradations);
    let updated_at = timestamp(fields, "updatedAt", &mut degradations);
    let mut completed_at = timestamp(fields, "completedAt", &mut degradations);

    match (status, completed_at) {
        (TaskStatus::Completed, None) => degradations.push(Degradation::MissingCompletedAt),
        (TaskStatus::Completed, Some(_)) => {}
        (_, Some(_)) if present(fields, "status").is_none() => {
            // A completion time with no status at all reads as completed.
            status = TaskStatus::Completed;
        }
        (_, Some(_)) => {
            degradations.push(Degradation::UnexpectedCompletedAt);
            completed_at = None;
        }
        (_, None) => {}
    }

    for d in &degradations {
        tracing::debug!(task_id = %id, degradation = ?d, "normalized malformed task field");
    }

    NormalizedTask {
        task: Task {
            id,
            title,
            priority,
            status,
            due_date,
            estimated_minutes,
            created_at,
            updated_at,
            completed_at,
        },
        degradations,
    }
}

/// A field that exists and is not `null`.
fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|v| !v.is_null())
}

fn timestamp(
    fields: &Map<String, Value>,
    key: &'static str,
    degradations: &mut Vec<Degradation>,
) -> Option<DateTime<Utc>> {
    let v = present(fields, key)?;
    let parsed = v
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc));
    if parsed.is_none() {
        degradations.push(Degradation::MalformedTimestamp {
            field: key,
            raw: raw_text(v),
        });
    }
    parsed
}

fn estimate_minutes(v: &Value) -> Option<u32> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() || n <= 0.0 || n > u32::MAX as f64 {
        return None;
    }
    Some(n.round().max(1.0) as u32)
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn raw_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
