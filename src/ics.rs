// src/ics.rs
//! iCalendar (RFC 5545) export of class entries.
//!
//! Day labels only carry `D.M.`, so the year is picked relative to a
//! reference date (normally the Monday of the requested week) and the result
//! is checked against the weekday named in the label. Entries that fail are
//! skipped and reported rather than failing the whole export.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use ical::generator::{Emitter, IcalCalendarBuilder};
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use thiserror::Error;

use crate::config::consts::{ICS_PRODID, ICS_UID_DOMAIN};
use crate::core::sanitize::sanitize_filename;
use crate::engine::types::weekday_in;
use crate::engine::{ClassEntry, WeeklySchedule};
use crate::slots;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("no D.M. date in day label {0:?}")]
    NoDate(String),
    #[error("{0:?} is not a calendar date")]
    BadDate(String),
    #[error("{label:?} resolves to {date}, a {actual}, not a {expected}")]
    WrongWeekday { label: String, date: NaiveDate, expected: Weekday, actual: Weekday },
    #[error("slot {0} has no lesson time")]
    NoSlotTime(u8),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub summary: String,
    pub description: String,
    pub location: String,
}

#[derive(Debug, Default)]
pub struct IcsExport {
    pub calendar: String,
    pub events: usize,
    /// (subject @ day label, why)
    pub skipped: Vec<(String, EventError)>,
}

/* ---------------- Dates ---------------- */

/// First `D.M` pair in the label.
fn day_month(label: &str) -> Option<(u32, u32)> {
    let bytes = label.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let d_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() { i += 1; }
            let day = &label[d_start..i];
            if i < bytes.len() && bytes[i] == b'.' {
                let m_start = i + 1;
                let mut j = m_start;
                while j < bytes.len() && bytes[j].is_ascii_digit() { j += 1; }
                if j > m_start {
                    return Some((day.parse().ok()?, label[m_start..j].parse().ok()?));
                }
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Calendar date named by a day label such as `"Torek 7.10."`.
pub fn resolve_day_date(label: &str, reference: NaiveDate) -> Result<NaiveDate, EventError> {
    let (day, month) = day_month(label).ok_or_else(|| EventError::NoDate(s!(label)))?;

    let date = [reference.year() - 1, reference.year(), reference.year() + 1]
        .into_iter()
        .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
        .min_by_key(|d| (*d - reference).num_days().abs())
        .ok_or_else(|| EventError::BadDate(s!(label)))?;

    if let Some(expected) = weekday_in(label) {
        if date.weekday() != expected {
            return Err(EventError::WrongWeekday {
                label: s!(label),
                date,
                expected,
                actual: date.weekday(),
            });
        }
    }
    Ok(date)
}

/* ---------------- Events ---------------- */

pub fn event_for(entry: &ClassEntry, class_name: &str, reference: NaiveDate) -> Result<CalendarEvent, EventError> {
    let date = resolve_day_date(&entry.day_label, reference)?;
    let (start, end) = slots::span(entry.time_slot, entry.duration_slots)
        .ok_or(EventError::NoSlotTime(entry.time_slot))?;

    let mut uid = format!(
        "{}-{}-{}",
        entry.subject.split_whitespace().collect::<Vec<_>>().join("-"),
        date.format("%d%m%Y"),
        start.format("%H%M"),
    );
    if let Some(g) = entry.sub_group_number {
        uid.push_str(&format!("-s{g}"));
    }
    uid.push('@');
    uid.push_str(ICS_UID_DOMAIN);

    let summary = match &entry.sub_group_label {
        Some(label) => format!("{} - {}", entry.subject, label),
        None => entry.subject.clone(),
    };

    let mut description = format!(
        "Class: {}\nTeacher: {}\nRoom: {}",
        class_name,
        entry.teacher.as_deref().unwrap_or("N/A"),
        entry.room.as_deref().unwrap_or("N/A"),
    );
    if let Some(note) = &entry.special_note {
        description.push_str("\nNote: ");
        description.push_str(note);
    }

    Ok(CalendarEvent {
        uid,
        start: date.and_time(start),
        end: date.and_time(end),
        summary,
        description,
        location: format!("Room {}", entry.room.as_deref().unwrap_or("TBD")),
    })
}

/* ---------------- Rendering ---------------- */

/// TEXT values go into `Property` escaped; the emitter writes them as given.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

fn prop(name: &str, value: String) -> Property {
    Property { name: s!(name), params: None, value: Some(value) }
}

fn fmt_stamp(dt: &NaiveDateTime) -> String {
    dt.format("%Y%m%dT%H%M%S").to_string()
}

/// DTSTART/DTEND are floating local times; DTSTAMP is UTC.
fn to_ical(ev: &CalendarEvent, stamp: &str) -> IcalEvent {
    let mut event = IcalEvent::new();
    event.properties = vec![
        prop("UID", ev.uid.clone()),
        prop("DTSTAMP", s!(stamp)),
        prop("DTSTART", fmt_stamp(&ev.start)),
        prop("DTEND", fmt_stamp(&ev.end)),
        prop("SUMMARY", escape_text(&ev.summary)),
        prop("DESCRIPTION", escape_text(&ev.description)),
        prop("LOCATION", escape_text(&ev.location)),
    ];
    event
}

pub fn render(events: &[CalendarEvent], stamp: NaiveDateTime) -> String {
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(ICS_PRODID)
        .build();

    let stamp = join!(&fmt_stamp(&stamp), "Z");
    calendar.events = events.iter().map(|ev| to_ical(ev, &stamp)).collect();
    calendar.generate()
}

/// Calendar with one event per class in `schedule` (filter it first if needed).
/// `stamp` is the DTSTAMP, in UTC.
pub fn schedule_to_ics(schedule: &WeeklySchedule, reference: NaiveDate, stamp: NaiveDateTime) -> IcsExport {
    let mut events = Vec::new();
    let mut skipped = Vec::new();

    for entry in schedule.entries() {
        match event_for(entry, &schedule.class_name, reference) {
            Ok(ev) => events.push(ev),
            Err(e) => {
                loge!("ICS: skip {} @ {}: {}", entry.subject, entry.day_label, e);
                skipped.push((format!("{} @ {}", entry.subject, entry.day_label), e));
            }
        }
    }

    logf!("ICS: {} event(s), {} skipped", events.len(), skipped.len());
    IcsExport { calendar: render(&events, stamp), events: events.len(), skipped }
}

pub fn entry_to_ics(
    entry: &ClassEntry,
    class_name: &str,
    reference: NaiveDate,
    stamp: NaiveDateTime,
) -> Result<String, EventError> {
    let ev = event_for(entry, class_name, reference)?;
    Ok(render(std::slice::from_ref(&ev), stamp))
}

/// `{subject}_{Day}` for a single-event file.
pub fn entry_file_stem(entry: &ClassEntry) -> String {
    let day = entry.day_label.split_whitespace().next().unwrap_or("dan");
    sanitize_filename(&format!("{}_{}", entry.subject, day), "urnik")
}

/// `{class}_week_{n}` for a whole-week file.
pub fn week_file_stem(class_name: &str, week: u32) -> String {
    let class = sanitize_filename(class_name, "urnik");
    format!("{class}_week_{week}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DayBlock;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stamp() -> NaiveDateTime {
        date(2025, 10, 1).and_hms_opt(12, 0, 0).unwrap()
    }

    fn rsr() -> ClassEntry {
        let mut e = ClassEntry::new("RSR lv", 2, 1.0);
        e.teacher = Some(s!("Uhan"));
        e.room = Some(s!("253"));
        e.sub_group_label = Some(s!("Skupina 2"));
        e.sub_group_number = Some(2);
        e.day_label = s!("Torek 7.10.");
        e
    }

    #[test]
    fn label_date_with_nearest_year() {
        assert_eq!(resolve_day_date("Torek 7.10.", date(2025, 10, 6)), Ok(date(2025, 10, 7)));
        // early January seen from late December
        assert_eq!(resolve_day_date("Petek 2.1.", date(2025, 12, 29)), Ok(date(2026, 1, 2)));
        assert_eq!(resolve_day_date("Sreda 8.10", date(2025, 10, 6)), Ok(date(2025, 10, 8)));
    }

    #[test]
    fn label_date_failures() {
        let r = date(2025, 10, 6);
        assert_eq!(resolve_day_date("Torek", r), Err(EventError::NoDate(s!("Torek"))));
        assert_eq!(resolve_day_date("Torek 31.2.", r), Err(EventError::BadDate(s!("Torek 31.2."))));
        assert!(matches!(
            resolve_day_date("Sreda 7.10.", r),
            Err(EventError::WrongWeekday { expected: Weekday::Wed, actual: Weekday::Tue, .. })
        ));
    }

    #[test]
    fn event_fields() {
        let ev = event_for(&rsr(), "RAI 2.l", date(2025, 10, 6)).unwrap();
        assert_eq!(ev.uid, "RSR-lv-07102025-0805-s2@sckranj.si");
        assert_eq!(ev.start, date(2025, 10, 7).and_hms_opt(8, 5, 0).unwrap());
        assert_eq!(ev.end, date(2025, 10, 7).and_hms_opt(8, 50, 0).unwrap());
        assert_eq!(ev.summary, "RSR lv - Skupina 2");
        assert_eq!(ev.description, "Class: RAI 2.l\nTeacher: Uhan\nRoom: 253");
        assert_eq!(ev.location, "Room 253");
    }

    #[test]
    fn single_event_calendar() {
        let text = entry_to_ics(&rsr(), "RAI 2.l", date(2025, 10, 6), stamp()).unwrap();
        assert!(text.starts_with("BEGIN:VCALENDAR"));
        assert!(text.contains("VERSION:2.0"));
        assert!(text.contains("PRODID:-//ŠC Kranj//Urnik//EN"));
        assert!(text.contains("DTSTART:20251007T080500\r\n"));
        assert!(text.contains("DTEND:20251007T085000\r\n"));
        assert!(text.contains("DTSTAMP:20251001T120000Z\r\n"));
        assert!(text.contains("DESCRIPTION:Class: RAI 2.l\\nTeacher: Uhan\\nRoom: 253\r\n"));
        assert_eq!(text.matches("BEGIN:VEVENT").count(), 1);
        assert!(text.trim_end().ends_with("END:VCALENDAR"));
    }

    #[test]
    fn week_calendar_skips_bad_labels() {
        let mut tue = DayBlock::new("Torek 7.10.");
        tue.classes.push(rsr());
        let mut bad = ClassEntry::new("NRO", 12, 1.0);
        bad.day_label = s!("Sreda");
        let mut wed = DayBlock::new("Sreda");
        wed.classes.push(bad);
        let sched = WeeklySchedule { class_name: s!("RAI 2.l"), week_label: s!(), days: vec![tue, wed] };

        let out = schedule_to_ics(&sched, date(2025, 10, 6), stamp());
        assert_eq!(out.events, 1);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.calendar.matches("BEGIN:VEVENT").count(), 1);
        assert!(out.calendar.contains("LOCATION:Room 253"));
    }

    #[test]
    fn text_escaping() {
        assert_eq!(escape_text("a;b,c\\d\ne"), "a\\;b\\,c\\\\d\\ne");
        assert_eq!(escape_text("Room 253"), "Room 253");
    }

    #[test]
    fn long_summary_survives_emission() {
        let mut e = rsr();
        e.subject = "č".repeat(60);
        e.sub_group_label = None;
        let text = entry_to_ics(&e, "RAI 2.l", date(2025, 10, 6), stamp()).unwrap();
        let unfolded = text.replace("\r\n ", "");
        assert!(unfolded.contains(&join!("SUMMARY:", &"č".repeat(60))));
    }

    #[test]
    fn file_stems() {
        assert_eq!(entry_file_stem(&rsr()), "RSR_lv_Torek");
        assert_eq!(week_file_stem("RAI 2.l", 41), "RAI_2.l_week_41");
    }
}
