// src/engine/extract.rs
//! Timetable page → [`WeeklySchedule`].
//!
//! Walks the rows of the `border="3"` schedule table once. Every row is
//! first placed on the occupancy grid, then its class cells are read. Which
//! day a class belongs to is carried from row to row in a [`ScanState`]
//! value; there is no other state.
//!
//! Extraction never fails. A page without the schedule table yields no days,
//! one without the class banner yields an empty class name.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use crate::core::html;
use crate::core::sanitize::{is_all_digits, number_after};

use super::grid::{CellGridResolver, CellShape, DayColumns, RecoveryStrategy, Resolution, ResolvedCell, MAX_COLS, RECOVERY_CHAIN};
use super::types::{weekday_in, ClassEntry, DayBlock, WeeklySchedule};

macro_rules! selector {
    ($name:ident, $css:expr) => {
        static $name: LazyLock<Selector> = LazyLock::new(|| html::selector($css));
    };
}

selector!(SCHEDULE_TABLE, r#"table[border="3"]"#);
selector!(BANNER, r##"font[size="7"][color="#0000FF" i]"##);
selector!(BANNER_ANY, r#"font[size="7"]"#);
selector!(DAY_BOLD, r#"font[size="4"] b"#);
selector!(MEDIUM_FONT, r#"font[size="3"]"#);
selector!(MEDIUM_BOLD, r#"font[size="3"] b"#);
selector!(SMALL_FONT, r#"font[size="2"]"#);
selector!(TABLE, "table");
selector!(TR, "tr");
selector!(TD, "td");

/// Text fragments that mark a day as "no lessons yet".
pub const NOTE_MARKERS: [&str; 2] = ["Pred začet", "šol.leta"];
pub const SUB_GROUP_MARKER: &str = "Skupina";

/// Day bookkeeping threaded through the row loop.
#[derive(Debug)]
enum ScanState {
    /// No day header seen yet.
    Idle,
    Open(OpenDay),
    /// Behind a repeated day header; cells are placed but not read.
    Skipping,
}

#[derive(Debug)]
struct OpenDay {
    index: usize,
    columns: DayColumns,
    /// Day carries a note, so its class cells are ignored.
    noted: bool,
}

impl ScanState {
    fn columns_mut(&mut self) -> Option<&mut DayColumns> {
        match self {
            ScanState::Open(day) => Some(&mut day.columns),
            _ => None,
        }
    }

    fn collecting(&self) -> Option<usize> {
        match self {
            ScanState::Open(day) if !day.noted => Some(day.index),
            _ => None,
        }
    }
}

/// A direct `<td>` of a schedule row, classified once.
struct Cell<'a> {
    el: ElementRef<'a>,
    shape: CellShape,
    day_label: Option<String>,
}

impl<'a> Cell<'a> {
    fn read(el: ElementRef<'a>) -> Self {
        let day_label = day_label(el);
        let shape = CellShape {
            has_bgcolor: html::attr(el, "bgcolor").is_some(),
            has_inner_table: html::first(el, &TABLE).is_some(),
            is_day_header: day_label.is_some(),
            ..CellShape::new(html::span(el, "colspan"), html::span(el, "rowspan"))
        };
        Self { el, shape, day_label }
    }
}

pub struct ScheduleExtractor {
    chain: &'static [&'static dyn RecoveryStrategy],
}

impl Default for ScheduleExtractor {
    fn default() -> Self { Self::new() }
}

impl ScheduleExtractor {
    pub fn new() -> Self {
        Self { chain: RECOVERY_CHAIN }
    }

    pub fn with_chain(chain: &'static [&'static dyn RecoveryStrategy]) -> Self {
        Self { chain }
    }

    /// Parse one timetable page. `week_label` is whatever the caller uses to
    /// name the week; it is copied through untouched.
    pub fn extract(&self, page: &str, week_label: &str) -> WeeklySchedule {
        let doc = html::parse(page);
        let root = doc.root_element();

        let class_name = html::first(root, &BANNER)
            .or_else(|| html::first(root, &BANNER_ANY))
            .map(html::text)
            .unwrap_or_default();

        let mut schedule = WeeklySchedule {
            class_name,
            week_label: s!(week_label),
            days: Vec::new(),
        };

        let Some(table) = html::first(root, &SCHEDULE_TABLE) else {
            logd!("Extract: no schedule table (class={:?})", schedule.class_name);
            return schedule;
        };

        let mut resolver = CellGridResolver::with_chain(self.chain);
        let mut days: Vec<DayBlock> = Vec::new();

        let mut state = ScanState::Idle;
        for (idx, tr) in html::own_rows(table).into_iter().enumerate() {
            let cells: Vec<Cell<'_>> = html::children_named(tr, "td").map(Cell::read).collect();
            if cells.is_empty() {
                continue;
            }
            state = scan_row(state, idx, &cells, &mut resolver, &mut days);
        }

        for day in &mut days {
            day.classes.sort_by_key(|c| c.time_slot);
        }

        logf!(
            "Extract: class={:?} days={} classes={} guessed={}",
            schedule.class_name,
            days.len(),
            days.iter().map(|d| d.classes.len()).sum::<usize>(),
            days.iter().flat_map(|d| &d.classes).filter(|c| c.resolution.is_guess()).count(),
        );

        schedule.days = days;
        schedule
    }
}

/// Convenience wrapper with the default recovery chain.
pub fn extract(page: &str, week_label: &str) -> WeeklySchedule {
    ScheduleExtractor::new().extract(page, week_label)
}

fn scan_row(
    state: ScanState,
    idx: usize,
    cells: &[Cell<'_>],
    resolver: &mut CellGridResolver,
    days: &mut Vec<DayBlock>,
) -> ScanState {
    let mut state = match cells.iter().find_map(|c| c.day_label.as_deref()) {
        Some(label) => open_day(idx, label, cells, days).unwrap_or(ScanState::Skipping),
        None => state,
    };

    let shapes: Vec<CellShape> = cells.iter().map(|c| c.shape).collect();
    let placed = resolver.place_row(idx, &shapes, state.columns_mut());

    if let Some(day_index) = state.collecting() {
        for (cell, pos) in cells.iter().zip(&placed) {
            if !cell.shape.is_class_shaped() { continue; }
            let day = &mut days[day_index];
            if let Some(entry) = read_class(cell.el, pos, &day.label) {
                day.classes.push(entry);
            }
        }
    }

    state
}

/// `None` when the label was already opened earlier on the page.
fn open_day(
    idx: usize,
    label: &str,
    cells: &[Cell<'_>],
    days: &mut Vec<DayBlock>,
) -> Option<ScanState> {
    if days.iter().any(|d| d.label == label) {
        logd!("Extract: row {} repeats day {:?}, ignored", idx, label);
        return None;
    }

    let note = cells.iter().find_map(|c| note_text(c.el));
    let noted = note.is_some();
    days.push(match note {
        Some(n) => {
            logd!("Extract: {:?} carries note {:?}", label, n);
            DayBlock::noted(label, n)
        }
        None => DayBlock::new(label),
    });

    Some(ScanState::Open(OpenDay { index: days.len() - 1, columns: DayColumns::new(idx), noted }))
}

/* ---------- cell readers ---------- */

fn day_label(td: ElementRef<'_>) -> Option<String> {
    td.select(&DAY_BOLD)
        .map(html::text)
        .find(|t| weekday_in(t).is_some())
}

fn note_text(td: ElementRef<'_>) -> Option<String> {
    td.select(&MEDIUM_FONT)
        .map(html::text)
        .find(|t| NOTE_MARKERS.iter().any(|m| t.contains(m)))
}

/// Slot for a start column: col 1-2 → 1, 3-4 → 2, ...
/// Column 0 belongs to the day label, so a class there is assumed to be slot 1.
/// The spare column at the ceiling has no slot.
pub fn slot_for_column(col: usize) -> Option<u8> {
    match col {
        0 => Some(1),
        c if c < MAX_COLS - 1 => Some(((c - 1) / 2 + 1) as u8),
        _ => None,
    }
}

fn read_class(td: ElementRef<'_>, pos: &ResolvedCell, day_label: &str) -> Option<ClassEntry> {
    let inner = html::first(td, &TABLE)?;
    let rows: Vec<ElementRef<'_>> = inner.select(&TR).collect();

    let mut teacher: Option<String> = None;
    let mut group_label: Option<String> = None;
    let mut subject = s!();
    let mut room: Option<String> = None;
    let mut notes: Vec<String> = Vec::new();

    // Row 0: teacher or "Skupina N"
    if let Some(top) = rows.first() {
        for cell in top.select(&TD) {
            let Some(font) = html::first(cell, &SMALL_FONT) else { continue };
            let text = html::text(font);
            if text.contains(SUB_GROUP_MARKER) {
                group_label.get_or_insert(text);
            } else if teacher.is_none() && !text.is_empty() {
                teacher = Some(text);
            }
        }
    }

    // Row 1: bold subject, numeric room, anything else is a note
    if let Some(bottom) = rows.get(1) {
        for cell in bottom.select(&TD) {
            if subject.is_empty() {
                if let Some(b) = html::first(cell, &MEDIUM_BOLD) {
                    subject = html::text(b);
                }
            }
            for font in cell.select(&SMALL_FONT) {
                let text = html::text(font);
                if text.is_empty() { continue; }
                if is_all_digits(&text) {
                    room = Some(text);
                } else if text.contains(SUB_GROUP_MARKER) {
                    group_label.get_or_insert(text);
                } else {
                    notes.push(text);
                }
            }
        }
    }

    if subject.is_empty() {
        logd!("Extract: {} col {} has no subject, dropped", day_label, pos.start_column);
        return None;
    }

    let Some(time_slot) = slot_for_column(pos.start_column) else {
        logd!("Extract: {} {:?} starts past the last slot, dropped", day_label, subject);
        return None;
    };

    let resolution = if pos.start_column == 0 {
        loge!("Extract: {} {:?} has no column, assumed slot 1", day_label, subject);
        Resolution::Unresolved
    } else {
        pos.resolution
    };

    let sub_group_number = group_label
        .as_deref()
        .and_then(|l| number_after(l, SUB_GROUP_MARKER))
        .and_then(|n| u8::try_from(n).ok());

    Some(ClassEntry {
        time_slot,
        duration_slots: pos.colspan as f32 / 2.0,
        subject,
        teacher,
        room,
        sub_group_label: group_label,
        sub_group_number,
        special_note: if notes.is_empty() { None } else { Some(notes.join(", ")) },
        background_color: html::attr(td, "bgcolor").map(str::to_string),
        day_label: s!(day_label),
        resolution,
    })
}
