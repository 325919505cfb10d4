//! Task prioritizer: deterministic display order for a task list.
//!
//! Ordering (stable, so ties keep their input order):
//! 1. open tasks before completed tasks
//! 2. open tasks by priority, urgent first
//! 3. then by due date, earliest first, undated last
//! 4. the completed tail keeps its input order

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono_tz::Tz;
use serde_json::Value;

use crate::error::Result;
use crate::record::normalize_records;
use crate::task::Task;

/// Return the tasks in display order. The input is left untouched.
pub fn prioritize(tasks: &[Task]) -> Vec<Task> {
    let mut out = tasks.to_vec();
    // slice::sort_by is stable
    out.sort_by(compare);
    out
}

/// Normalize loosely-typed records, then prioritize them.
///
/// Malformed fields degrade (unknown priority to `low`, bad due date to
/// none, a non-object element to an untitled low task); only a non-array
/// input is an error.
pub fn prioritize_records(value: &Value, tz: Tz) -> Result<Vec<Task>> {
    let tasks: Vec<Task> = normalize_records(value, tz)?
        .into_iter()
        .map(|n| n.task)
        .collect();
    Ok(prioritize(&tasks))
}

/// The ordering used by [`prioritize`]. `Less` means `a` is shown first.
pub fn compare(a: &Task, b: &Task) -> Ordering {
    match (a.is_completed(), b.is_completed()) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
        (false, false) => a
            .priority
            .cmp(&b.priority)
            .then_with(|| match (a.due_date, b.due_date) {
                (Some(da), Some(db)) => da.cmp(&db),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }),
    }
}

/// Whether `tasks` is already in the order [`prioritize`] would produce.
pub fn is_prioritized(tasks: &[Task]) -> bool {
    tasks
        .windows(2)
        .all(|w| compare(&w[0], &w[1]) != Ordering::Greater)
}

/// Same multiset of task ids, in any order.
pub fn is_permutation_of(original: &[Task], reordered: &[Task]) -> bool {
    if original.len() != reordered.len() {
        return false;
    }
    let mut counts: HashMap<&str, isize> = HashMap::new();
    for t in original {
        *counts.entry(t.id.as_str()).or_default() += 1;
    }
    for t in reordered {
        *counts.entry(t.id.as_str()).or_default() -= 1;
    }
    counts.values().all(|&c| c == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::task::{Priority, TaskStatus};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde_json::json;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn open(id: &str, p: Priority) -> Task {
        Task::new(id, id).with_priority(p)
    }

    fn done(id: &str, p: Priority) -> Task {
        Task::new(id, id).with_priority(p).completed_at(base())
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn empty_and_single() {
        assert!(prioritize(&[]).is_empty());
        let one = vec![done("only", Priority::Low)];
        assert_eq!(prioritize(&one), one);
    }

    #[test]
    fn example_scenario_urgent_low_then_completed() {
        let tasks = vec![
            open("low", Priority::Low),
            open("urgent", Priority::Urgent),
            done("medium", Priority::Medium),
        ];
        assert_eq!(ids(&prioritize(&tasks)), vec!["urgent", "low", "medium"]);
    }

    #[test]
    fn completed_sort_last_even_when_urgent() {
        let tasks = vec![done("d", Priority::Urgent), open("o", Priority::Low)];
        assert_eq!(ids(&prioritize(&tasks)), vec!["o", "d"]);
    }

    #[test]
    fn due_date_breaks_priority_ties_and_undated_go_last() {
        let tasks = vec![
            open("undated", Priority::High),
            open("later", Priority::High).with_due_date(base() + Duration::days(3)),
            open("sooner", Priority::High).with_due_date(base() + Duration::hours(2)),
            open("medium-soon", Priority::Medium).with_due_date(base()),
        ];
        assert_eq!(
            ids(&prioritize(&tasks)),
            vec!["sooner", "later", "undated", "medium-soon"]
        );
    }

    #[test]
    fn ties_keep_input_order() {
        let tasks = vec![
            open("a", Priority::Medium),
            open("b", Priority::Medium),
            open("c", Priority::Medium).with_status(TaskStatus::InProgress),
        ];
        assert_eq!(ids(&prioritize(&tasks)), vec!["a", "b", "c"]);
    }

    #[test]
    fn completed_tail_is_not_reranked() {
        let tasks = vec![
            done("d-low", Priority::Low),
            open("o", Priority::Medium),
            done("d-urgent", Priority::Urgent),
        ];
        assert_eq!(ids(&prioritize(&tasks)), vec!["o", "d-low", "d-urgent"]);
    }

    #[test]
    fn input_is_not_mutated() {
        let tasks = vec![open("low", Priority::Low), open("urgent", Priority::Urgent)];
        let before = tasks.clone();
        let _ = prioritize(&tasks);
        assert_eq!(tasks, before);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let tasks = vec![
            open("a", Priority::Low),
            done("b", Priority::High),
            open("c", Priority::Urgent).with_due_date(base()),
            open("d", Priority::Urgent),
        ];
        let once = prioritize(&tasks);
        assert!(is_prioritized(&once));
        assert!(!is_prioritized(&tasks));
        assert_eq!(prioritize(&once), once);
    }

    #[test]
    fn permutation_check_counts_duplicates() {
        let a = vec![open("x", Priority::Low), open("x", Priority::Low), open("y", Priority::Low)];
        let b = vec![open("y", Priority::Low), open("x", Priority::Low), open("x", Priority::Low)];
        let c = vec![open("y", Priority::Low), open("y", Priority::Low), open("x", Priority::Low)];
        assert!(is_permutation_of(&a, &b));
        assert!(!is_permutation_of(&a, &c));
        assert!(!is_permutation_of(&a, &b[..2]));
        assert!(is_permutation_of(&a, &prioritize(&a)));
    }

    #[test]
    fn records_with_bad_priority_rank_as_low() {
        let records = json!([
            {"id": "bad", "title": "mystery", "priority": "whenever"},
            {"id": "low", "title": "chores", "priority": "low"},
            {"id": "high", "title": "deploy", "priority": "high", "dueDate": "not a date"},
        ]);
        let out = prioritize_records(&records, Tz::UTC).unwrap();
        assert_eq!(ids(&out), vec!["high", "bad", "low"]);
        assert_eq!(out[0].due_date, None);
    }

    #[test]
    fn stray_null_record_still_ranks() {
        let records = json!([
            {"id": "done", "title": "x", "priority": "high", "completedAt": "2026-03-01T10:00:00Z"},
            null,
            {"id": "urgent", "title": "y", "priority": "urgent"},
        ]);
        let out = prioritize_records(&records, Tz::UTC).unwrap();
        assert_eq!(ids(&out), vec!["urgent", "record-1", "done"]);
    }

    #[test]
    fn records_reject_null() {
        let err = prioritize_records(&Value::Null, Tz::UTC).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }
}
