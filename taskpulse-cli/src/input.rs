//! Load task records from disk as JSON values for the engine to normalize.
//!
//! Formats:
//! - `.json`: an array of records, or an object with a `tasks` array
//! - `.csv`: header row with record field names (`id,title,priority,...`)

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(InputFormat::Json),
            Some("csv") => Ok(InputFormat::Csv),
            _ => bail!(
                "cannot tell the format of {} (use --format json|csv)",
                path.display()
            ),
        }
    }
}

pub fn load_records(path: &Path, format: Option<InputFormat>) -> Result<Value> {
    let format = match format {
        Some(f) => f,
        None => InputFormat::from_path(path)?,
    };
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = match format {
        InputFormat::Json => parse_json(&raw),
        InputFormat::Csv => parse_csv(&raw),
    }
    .with_context(|| format!("parse {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        records = value.as_array().map(Vec::len).unwrap_or(0),
        "loaded task records"
    );
    Ok(value)
}

pub fn parse_json(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw).context("invalid JSON")?;
    Ok(match value {
        Value::Object(mut obj) if obj.get("tasks").is_some_and(Value::is_array) => {
            obj.remove("tasks").unwrap_or(Value::Null)
        }
        other => other,
    })
}

/// Empty cells are treated as absent fields.
pub fn parse_csv(raw: &str) -> Result<Value> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let headers = rdr.headers().context("read CSV header")?.clone();
    let mut records = Vec::new();

    for (i, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("read CSV row {}", i + 2))?;
        let mut fields = Map::new();
        for (name, cell) in headers.iter().zip(row.iter()) {
            if !cell.is_empty() {
                fields.insert(name.to_string(), Value::String(cell.to_string()));
            }
        }
        records.push(Value::Object(fields));
    }

    Ok(Value::Array(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn json_accepts_bare_array_and_tasks_wrapper() {
        let bare = parse_json(r#"[{"id":"a"}]"#).unwrap();
        assert_eq!(bare.as_array().unwrap().len(), 1);

        let wrapped = parse_json(r#"{"tasks":[{"id":"a"},{"id":"b"}]}"#).unwrap();
        assert_eq!(wrapped.as_array().unwrap().len(), 2);

        // Left for the engine to reject.
        let other = parse_json(r#"{"id":"a"}"#).unwrap();
        assert!(other.is_object());
    }

    #[test]
    fn csv_rows_become_string_records() {
        let v = parse_csv(
            "id,title,priority,status,dueDate,estimatedMinutes\n\
             t1, Pay rent ,urgent,todo,2026-03-01,15\n\
             t2,Stretch,low,completed,,\n",
        )
        .unwrap();
        let rows = v.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["title"], "Pay rent");
        assert_eq!(rows[0]["estimatedMinutes"], "15");
        assert!(rows[1].get("dueDate").is_none());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("a/tasks.JSON")).unwrap(), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("tasks.csv")).unwrap(), InputFormat::Csv);
        assert!(InputFormat::from_path(Path::new("tasks.txt")).is_err());
    }

    #[test]
    fn load_records_reads_from_disk() {
        let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(f, r#"[{{"id":"a","title":"A","priority":"high"}}]"#).unwrap();

        let v = load_records(f.path(), None).unwrap();
        assert_eq!(v[0]["priority"], "high");
    }

    #[test]
    fn explicit_format_overrides_extension() {
        let mut f = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(f, "id,title\nx,y\n").unwrap();

        let v = load_records(f.path(), Some(InputFormat::Csv)).unwrap();
        assert_eq!(v[0]["id"], "x");
    }
}
