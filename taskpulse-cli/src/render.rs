use anyhow::{Context, Result};
use chrono_tz::Tz;
use std::fmt::Write as _;
use taskpulse_core::{ProductivityAnalysis, Task};

pub fn ranked_json(tasks: &[Task], limit: usize) -> Result<String> {
    let shown: Vec<&Task> = tasks.iter().take(limit).collect();
    serde_json::to_string_pretty(&shown).context("serialize ranked tasks")
}

pub fn ranked_text(tasks: &[Task], limit: usize, tz: Tz) -> String {
    let mut out = String::new();
    if tasks.is_empty() {
        out.push_str("No tasks.\n");
        return out;
    }

    for (i, t) in tasks.iter().take(limit).enumerate() {
        let _ = write!(
            out,
            "{:>3}. {:<11} {:<7} {}",
            i + 1,
            t.status.as_str(),
            t.priority.as_str(),
            t.title
        );
        if let Some(due) = t.due_date {
            let _ = write!(out, " (due {})", due.with_timezone(&tz).format("%Y-%m-%d %H:%M"));
        }
        if let Some(m) = t.estimated_minutes {
            let _ = write!(out, " ~{m}m");
        }
        out.push('\n');
    }

    if tasks.len() > limit {
        let _ = writeln!(out, "... {} more", tasks.len() - limit);
    }
    out
}

pub fn analysis_json(analysis: &ProductivityAnalysis) -> Result<String> {
    serde_json::to_string_pretty(analysis).context("serialize analysis")
}

pub fn analysis_text(analysis: &ProductivityAnalysis) -> String {
    let mut out = format!("Productivity score: {}/100\n\nInsights:\n", analysis.score);
    for i in &analysis.insights {
        let _ = writeln!(out, "- {i}");
    }
    out.push_str("\nRecommendations:\n");
    for r in &analysis.recommendations {
        let _ = writeln!(out, "- {r}");
    }
    out
}
