use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use taskpulse_core::{Analyzer, parse_timezone};

use crate::state::ensure_taskpulse_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub display: DisplaySection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// IANA zone for due dates without an offset and for "today".
    pub timezone: String,
    pub saturation: f64,
    pub focus_threshold: f64,
    pub low_focus_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    pub limit: usize,
    pub json: bool,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        let stock = Analyzer::default();
        Self {
            timezone: "UTC".to_string(),
            saturation: stock.saturation,
            focus_threshold: stock.focus_threshold,
            low_focus_threshold: stock.low_focus_threshold,
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            limit: 20,
            json: false,
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        parse_timezone(&self.analysis.timezone)
            .ok_or_else(|| anyhow!("invalid timezone in config: {}", self.analysis.timezone))
    }

    pub fn analyzer(&self) -> Result<Analyzer> {
        let a = &self.analysis;
        if !(a.saturation.is_finite() && a.saturation > 0.0) {
            anyhow::bail!("analysis.saturation must be a positive number, got {}", a.saturation);
        }
        Ok(Analyzer {
            timezone: self.timezone()?,
            saturation: a.saturation,
            focus_threshold: a.focus_threshold,
            low_focus_threshold: a.low_focus_threshold,
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_taskpulse_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        tracing::debug!(path = %p.display(), "no config file; using defaults");
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// Write the default config unless one exists. Returns the path and whether it was written.
pub fn init_config() -> Result<(PathBuf, bool)> {
    let p = config_path()?;
    if p.exists() {
        return Ok((p, false));
    }
    save_config_to(&Config::default(), &p)?;
    Ok((p, true))
}
