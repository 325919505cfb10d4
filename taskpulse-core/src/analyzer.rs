//! Productivity analyzer: score, insights and recommendations from completed work.
//!
//! Scoring:
//! - reach(n) = 1 - e^(-n / saturation), concave and strictly below 1
//! - mix = mean importance weight of weighted tasks (see [`Priority::weight`])
//! - score = round((80 + 20 * mix) * reach(n)), clamped to 0..=100
//!
//! A task is weighted when it has a `completed_at` (and, for boundary
//! records, a recognized priority). Unweighted tasks still count toward n.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::record::normalize_records;
use crate::task::{Priority, Task};

const BASE_CEILING: f64 = 80.0;
const MIX_BONUS: f64 = 20.0;
const DEFAULT_SATURATION: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityAnalysis {
    /// 0..=100
    pub score: u8,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Analyzer settings. `Default` is UTC with the stock curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analyzer {
    /// Zone used for time-of-day and calendar-day insights.
    pub timezone: Tz,
    /// Completions needed to reach ~63% of the ceiling.
    pub saturation: f64,
    /// Mix at or above which focus on important work is called out.
    pub focus_threshold: f64,
    /// Mix below which higher-priority work is recommended.
    pub low_focus_threshold: f64,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            saturation: DEFAULT_SATURATION,
            focus_threshold: 0.5,
            low_focus_threshold: 0.3,
        }
    }
}

/// Analyze with the default settings.
pub fn analyze(completed: &[Task]) -> ProductivityAnalysis {
    Analyzer::default().analyze(completed)
}

/// Normalize records, then analyze with the default settings.
pub fn analyze_records(value: &Value) -> Result<ProductivityAnalysis> {
    Analyzer::default().analyze_records(value)
}

impl Analyzer {
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    /// Every input task is treated as completed; no status filtering happens here.
    pub fn analyze(&self, completed: &[Task]) -> ProductivityAnalysis {
        let summary = Summary::collect(
            completed.iter().map(|t| (t, t.completed_at.is_some())),
            self.timezone,
        );
        self.report(&summary)
    }

    pub fn analyze_records(&self, value: &Value) -> Result<ProductivityAnalysis> {
        let normalized = normalize_records(value, self.timezone)?;
        let summary = Summary::collect(
            normalized.iter().map(|n| (&n.task, n.is_weighted())),
            self.timezone,
        );
        Ok(self.report(&summary))
    }

    /// The score curve. Non-decreasing in `count`; `score(0, _) == 0`.
    pub fn score(&self, count: usize, mix: f64) -> u8 {
        if count == 0 {
            return 0;
        }
        let saturation = if self.saturation.is_finite() && self.saturation > 0.0 {
            self.saturation
        } else {
            DEFAULT_SATURATION
        };
        let mix = if mix.is_finite() { mix.clamp(0.0, 1.0) } else { 0.0 };
        let reach = 1.0 - (-(count as f64) / saturation).exp();
        let raw = (BASE_CEILING + MIX_BONUS * mix) * reach;
        raw.round().clamp(0.0, 100.0) as u8
    }

    fn report(&self, s: &Summary) -> ProductivityAnalysis {
        if s.count == 0 {
            return ProductivityAnalysis {
                score: 0,
                insights: vec!["No tasks completed yet.".to_string()],
                recommendations: vec![
                    "Pick one small task and complete it to get started.".to_string(),
                ],
            };
        }

        let mut insights = vec![format!("Completed {}.", plural(s.count, "task"))];
        let mut recommendations = Vec::new();

        if s.weighted > 0 {
            let important: usize = Priority::ALL
                .iter()
                .filter(|p| p.is_important())
                .map(|p| s.by_priority[rank(*p)])
                .sum();
            insights.push(format!(
                "{important} of {} were high or urgent priority.",
                plural(s.weighted, "weighted completion")
            ));
            if s.mix < self.low_focus_threshold {
                recommendations.push(
                    "Tackle a high-priority task next; most completed work was low priority."
                        .to_string(),
                );
            } else if s.mix >= self.focus_threshold {
                recommendations.push(
                    "Strong focus on important work. Keep scheduling urgent items early."
                        .to_string(),
                );
            }
        } else {
            insights.push("None of the completed tasks carried usable priority data.".to_string());
            recommendations
                .push("Set priorities on tasks so important work can be tracked.".to_string());
        }

        let unweighted = s.count - s.weighted;
        if s.weighted > 0 && unweighted > 0 {
            insights.push(format!(
                "{} left out of the priority mix: missing priority or completion time.",
                plural(unweighted, "task")
            ));
        }

        if s.estimated_count > 0 {
            insights.push(format!(
                "About {} of estimated work finished.",
                format_minutes(s.estimated_minutes)
            ));
        }
        if s.estimated_count < s.count {
            recommendations
                .push("Add time estimates to tasks to make planning more accurate.".to_string());
        }

        if s.late > 0 {
            insights.push(format!("{} finished after the due date.", plural(s.late, "task")));
            recommendations.push(
                "Review upcoming due dates so fewer tasks slip past their deadline.".to_string(),
            );
        }

        if let Some(part) = s.dominant_part_of_day() {
            insights.push(format!("Most completions landed in the {}.", part.as_str()));
            if matches!(part, PartOfDay::Evening | PartOfDay::Night) {
                recommendations.push(
                    "Try moving demanding work earlier in the day, when focus is usually higher."
                        .to_string(),
                );
            }
        }

        let run = s.longest_day_run();
        if run >= 2 {
            insights.push(format!("Completed work on {run} consecutive days."));
        } else if s.days.len() > 1 {
            insights.push(format!("Completions span {} separate days.", s.days.len()));
        }

        if s.count < 3 {
            recommendations.push("Aim for a few more completions to build momentum.".to_string());
        }
        if recommendations.is_empty() {
            recommendations.push("Keep up the steady pace.".to_string());
        }

        ProductivityAnalysis {
            score: self.score(s.count, s.mix),
            insights,
            recommendations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl PartOfDay {
    fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => PartOfDay::Morning,
            12..=16 => PartOfDay::Afternoon,
            17..=21 => PartOfDay::Evening,
            _ => PartOfDay::Night,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn as_str(self) -> &'static str {
        match self {
            PartOfDay::Morning => "morning",
            PartOfDay::Afternoon => "afternoon",
            PartOfDay::Evening => "evening",
            PartOfDay::Night => "night",
        }
    }
}

#[derive(Debug, Default)]
struct Summary {
    count: usize,
    weighted: usize,
    /// Weighted tasks per priority, indexed by rank.
    by_priority: [usize; 4],
    mix: f64,
    estimated_minutes: u64,
    estimated_count: usize,
    late: usize,
    timed: usize,
    parts: [usize; 4],
    days: BTreeSet<NaiveDate>,
}

impl Summary {
    fn collect<'a>(entries: impl Iterator<Item = (&'a Task, bool)>, tz: Tz) -> Self {
        let mut s = Summary::default();

        for (task, weighted) in entries {
            s.count += 1;

            if weighted {
                s.weighted += 1;
                s.by_priority[rank(task.priority)] += 1;
            }

            if let Some(minutes) = task.estimated_minutes {
                s.estimated_minutes += u64::from(minutes);
                s.estimated_count += 1;
            }

            if task.finished_late() {
                s.late += 1;
            }

            if let Some(done) = task.completed_at {
                let local = done.with_timezone(&tz);
                s.timed += 1;
                s.parts[PartOfDay::from_hour(local.hour()).index()] += 1;
                s.days.insert(local.date_naive());
            }
        }

        if s.weighted > 0 {
            let weight_sum: f64 = Priority::ALL
                .iter()
                .map(|p| s.by_priority[rank(*p)] as f64 * p.weight())
                .sum();
            s.mix = weight_sum / s.weighted as f64;
        }
        s
    }

    /// A part of day holding a strict majority of at least two timed completions.
    fn dominant_part_of_day(&self) -> Option<PartOfDay> {
        if self.timed < 2 {
            return None;
        }
        [PartOfDay::Morning, PartOfDay::Afternoon, PartOfDay::Evening, PartOfDay::Night]
            .into_iter()
            .find(|p| self.parts[p.index()] * 2 > self.timed)
    }

    fn longest_day_run(&self) -> usize {
        let mut best = 0;
        let mut run = 0;
        let mut prev: Option<NaiveDate> = None;
        for &day in &self.days {
            run = match prev {
                Some(p) if (day - p).num_days() == 1 => run + 1,
                _ => 1,
            };
            best = best.max(run);
            prev = Some(day);
        }
        best
    }
}

fn rank(p: Priority) -> usize {
    p as usize
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn format_minutes(total: u64) -> String {
    let (h, m) = (total / 60, total % 60);
    match (h, m) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} h"),
        (h, m) => format!("{h} h {m} min"),
    }
}
