// src/csv.rs
use std::io::{self, Write};

use crate::engine::WeeklySchedule;
use crate::slots;

/* ---------------- Writing ---------------- */

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV/TSV row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[String], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first { write!(w, "{}", sep)?; } else { first = false; }
        if needs_quotes(cell, sep) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/* ---------------- Schedule → rows ---------------- */

pub fn schedule_headers() -> Vec<String> {
    strings!["Day", "Slot", "Time", "Duration", "Subject", "Teacher", "Room", "Skupina", "Note"]
}

/// One row per class; days with a note get a single row carrying it.
pub fn schedule_rows(schedule: &WeeklySchedule) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(schedule.class_count());
    for day in &schedule.days {
        if let Some(note) = &day.note {
            rows.push(vec![
                day.label.clone(), s!(), s!(), s!(), s!(), s!(), s!(), s!(), note.clone(),
            ]);
            continue;
        }
        for c in &day.classes {
            rows.push(vec![
                day.label.clone(),
                c.time_slot.to_string(),
                slots::time_range(c.time_slot, c.duration_slots),
                c.duration_slots.to_string(),
                c.subject.clone(),
                c.teacher.clone().unwrap_or_default(),
                c.room.clone().unwrap_or_default(),
                c.sub_group_number.map(|n| n.to_string()).unwrap_or_default(),
                c.special_note.clone().unwrap_or_default(),
            ]);
        }
    }
    rows
}

/// Full export string (Copy/Export).
pub fn to_export_string(
    headers: &[String],
    rows: &[Vec<String>],
    include_headers: bool,
    sep: char,
) -> String {
    let mut buf: Vec<u8> = Vec::new();

    if include_headers {
        let _ = write_row(&mut buf, headers, sep);
    }
    for r in rows {
        let _ = write_row(&mut buf, r, sep);
    }

    match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
    }
}
