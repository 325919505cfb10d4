//! Collaborator-side selection: which tasks feed the analyzer.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::task::Task;
use crate::time::local_day;

/// Completed tasks whose completion falls on `day` in `tz`, in input order.
///
/// Tasks marked completed without a completion time cannot be placed on a
/// day and are left out.
pub fn completed_on(tasks: &[Task], day: NaiveDate, tz: Tz) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.is_completed())
        .filter(|t| t.completed_at.is_some_and(|at| local_day(at, tz) == day))
        .cloned()
        .collect()
}

/// [`completed_on`] for the local day containing `now`.
pub fn completed_today(tasks: &[Task], now: DateTime<Utc>, tz: Tz) -> Vec<Task> {
    completed_on(tasks, local_day(now, tz), tz)
}

/// All completed tasks, in input order.
pub fn completed(tasks: &[Task]) -> Vec<Task> {
    tasks.iter().filter(|t| t.is_completed()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;
    use chrono::TimeZone;

    #[test]
    fn picks_completions_on_the_local_day() {
        let chicago = chrono_tz::America::Chicago;
        // 2026-02-21 03:00 UTC is still the 20th in Chicago.
        let late_night = Utc.with_ymd_and_hms(2026, 2, 21, 3, 0, 0).unwrap();
        let morning = Utc.with_ymd_and_hms(2026, 2, 21, 15, 0, 0).unwrap();

        let tasks = vec![
            Task::new("a", "a").completed_at(late_night),
            Task::new("b", "b").completed_at(morning),
            Task::new("c", "c"),
            Task::new("d", "d").with_status(TaskStatus::Completed),
        ];

        let feb20 = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
        let feb21 = NaiveDate::from_ymd_opt(2026, 2, 21).unwrap();

        let ids = |v: Vec<Task>| v.into_iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids(completed_on(&tasks, feb20, chicago)), vec!["a"]);
        assert_eq!(ids(completed_on(&tasks, feb21, chicago)), vec!["b"]);
        assert_eq!(ids(completed_on(&tasks, feb21, Tz::UTC)), vec!["a", "b"]);
        assert_eq!(ids(completed_today(&tasks, morning, chicago)), vec!["b"]);
        assert_eq!(ids(completed(&tasks)), vec!["a", "b", "d"]);
    }
}
