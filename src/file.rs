// src/file.rs

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::options::{ExportFormat, ExportOptions};
use crate::csv::{schedule_headers, schedule_rows, to_export_string};
use crate::engine::{ClassEntry, WeeklySchedule};
use crate::ics;

/// What an export produced besides the text itself.
#[derive(Debug, Default)]
pub struct Rendered {
    pub text: String,
    pub items: usize,
    /// Human-readable reasons for entries left out (ICS only).
    pub skipped: Vec<String>,
}

/// Render `schedule` in the configured format without touching disk (used by Copy).
/// `reference` anchors day labels to a year; `stamp` is the ICS DTSTAMP.
pub fn render_export(
    export: &ExportOptions,
    schedule: &WeeklySchedule,
    reference: NaiveDate,
    stamp: NaiveDateTime,
) -> Result<Rendered, Box<dyn std::error::Error>> {
    Ok(match export.format {
        ExportFormat::Ics => {
            let out = ics::schedule_to_ics(schedule, reference, stamp);
            Rendered {
                text: out.calendar,
                items: out.events,
                skipped: out.skipped.iter().map(|(what, why)| format!("{what}: {why}")).collect(),
            }
        }
        ExportFormat::Csv | ExportFormat::Tsv => {
            let sep = export.format.delim().ok_or("tabular format without delimiter")?;
            let rows = schedule_rows(schedule);
            Rendered {
                text: to_export_string(&schedule_headers(), &rows, export.include_headers, sep),
                items: rows.len(),
                skipped: Vec::new(),
            }
        }
        ExportFormat::Json => Rendered {
            text: serde_json::to_string_pretty(schedule)?,
            items: schedule.class_count(),
            skipped: Vec::new(),
        },
    })
}

/// Write a whole-week export to `export.out_path()`. Returns the path and what was rendered.
pub fn write_export(
    export: &ExportOptions,
    schedule: &WeeklySchedule,
    reference: NaiveDate,
    stamp: NaiveDateTime,
) -> Result<(PathBuf, Rendered), Box<dyn std::error::Error>> {
    let rendered = render_export(export, schedule, reference, stamp)?;
    let path = export.out_path();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }

    fs::write(&path, &rendered.text)?;
    logf!("Export: {:?} → {} ({} item(s))", export.format, path.display(), rendered.items);
    Ok((path, rendered))
}

/// Write one class as its own `.ics` into `dir`, never overwriting.
pub fn write_entry_ics(
    dir: &Path,
    entry: &ClassEntry,
    class_name: &str,
    reference: NaiveDate,
    stamp: NaiveDateTime,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let text = ics::entry_to_ics(entry, class_name, reference, stamp)?;
    ensure_directory(dir)?;
    let path = unique_path(dir, &ics::entry_file_stem(entry), "ics");
    fs::write(&path, text)?;
    logf!("Export: entry {} → {}", entry.subject, path.display());
    Ok(path)
}

pub fn ensure_directory(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if dir.exists() && !dir.is_dir() {
        return Err(format!("Path exists but is not a directory: {}", dir.display()).into());
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

/// First free "<stem>.ext", then "<stem> (2).ext", "<stem> (3).ext", ...
pub fn unique_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let first = dir.join(format!("{stem}.{ext}"));
    if !first.exists() {
        return first;
    }
    (2..)
        .map(|n| dir.join(format!("{stem} ({n}).{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}
