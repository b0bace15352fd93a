// src/engine/types.rs
use chrono::Weekday;
use serde::Serialize;

use super::grid::Resolution;

/// Day names as printed in the day-label column, Monday first.
pub const DAY_NAMES: [(&str, Weekday); 5] = [
    ("Ponedeljek", Weekday::Mon),
    ("Torek", Weekday::Tue),
    ("Sreda", Weekday::Wed),
    ("Četrtek", Weekday::Thu),
    ("Petek", Weekday::Fri),
];

/// Case-sensitive substring match against [`DAY_NAMES`].
pub fn weekday_in(text: &str) -> Option<Weekday> {
    DAY_NAMES
        .iter()
        .find(|(name, _)| text.contains(name))
        .map(|(_, wd)| *wd)
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WeeklySchedule {
    pub class_name: String,
    pub week_label: String,
    pub days: Vec<DayBlock>,
}

impl WeeklySchedule {
    pub fn entries(&self) -> impl Iterator<Item = &ClassEntry> {
        self.days.iter().flat_map(|d| d.classes.iter())
    }

    pub fn class_count(&self) -> usize {
        self.days.iter().map(|d| d.classes.len()).sum()
    }

    pub fn day(&self, weekday: Weekday) -> Option<&DayBlock> {
        self.days.iter().find(|d| d.weekday() == Some(weekday))
    }

    /// Entries whose column had to be guessed.
    pub fn guessed(&self) -> impl Iterator<Item = &ClassEntry> {
        self.entries().filter(|e| e.resolution.is_guess())
    }
}

/// One weekday. Holds classes or a note, never both.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DayBlock {
    pub label: String,
    pub classes: Vec<ClassEntry>,
    pub note: Option<String>,
}

impl DayBlock {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), classes: Vec::new(), note: None }
    }

    pub fn noted(label: impl Into<String>, note: impl Into<String>) -> Self {
        Self { label: label.into(), classes: Vec::new(), note: Some(note.into()) }
    }

    pub fn weekday(&self) -> Option<Weekday> {
        weekday_in(&self.label)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassEntry {
    /// 1-based lesson slot.
    pub time_slot: u8,
    /// Slots covered, `colspan / 2`. Half slots do occur.
    pub duration_slots: f32,
    pub subject: String,
    pub teacher: Option<String>,
    pub room: Option<String>,
    pub sub_group_label: Option<String>,
    pub sub_group_number: Option<u8>,
    pub special_note: Option<String>,
    pub background_color: Option<String>,
    pub day_label: String,
    pub resolution: Resolution,
}

impl ClassEntry {
    pub fn new(subject: impl Into<String>, time_slot: u8, duration_slots: f32) -> Self {
        Self {
            time_slot,
            duration_slots,
            subject: subject.into(),
            teacher: None,
            room: None,
            sub_group_label: None,
            sub_group_number: None,
            special_note: None,
            background_color: None,
            day_label: s!(),
            resolution: Resolution::Direct,
        }
    }
}
