use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$TASKPULSE_HOME`, else `~/.taskpulse`.
pub fn taskpulse_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TASKPULSE_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set (or set TASKPULSE_HOME)")?;
    Ok(PathBuf::from(home).join(".taskpulse"))
}

pub fn ensure_taskpulse_home() -> Result<PathBuf> {
    let dir = taskpulse_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
