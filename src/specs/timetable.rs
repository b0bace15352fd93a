// src/specs/timetable.rs

use std::path::Path;

use crate::core::net::{FetchError, TimetableSource};
use crate::engine::{extract, WeeklySchedule};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimetableRequest {
    pub week: u32,
    pub class_id: u32,
    /// Copied into `WeeklySchedule::week_label`.
    pub week_label: String,
}

impl TimetableRequest {
    pub fn new(week: u32, class_id: u32) -> Self {
        Self { week, class_id, week_label: format!("Teden {week}") }
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.week_label = label.into();
        self
    }
}

pub fn fetch(source: &dyn TimetableSource, req: &TimetableRequest) -> Result<WeeklySchedule, FetchError> {
    let page = source.fetch_page(req.week, req.class_id)?;
    let schedule = parse_doc(&page, &req.week_label);
    if schedule.days.is_empty() {
        logd!("Timetable: week {} class {} has no days", req.week, req.class_id);
    }
    Ok(schedule)
}

/// Offline entry point, also used by tests and benches.
pub fn parse_doc(page: &str, week_label: &str) -> WeeklySchedule {
    extract(page, week_label)
}

pub fn load_file(path: &Path, week_label: &str) -> Result<WeeklySchedule, Box<dyn std::error::Error>> {
    let page = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
    Ok(parse_doc(&page, week_label))
}
