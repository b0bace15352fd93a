// src/runner.rs
use std::error::Error;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

use crate::{
    config::options::{AppOptions, SourceOptions},
    core::net::{HttpSource, TimetableSource},
    engine::WeeklySchedule,
    file::{self, Rendered},
    ics,
    specs::{catalog::{week_candidates, WeekOption}, timetable::{self, TimetableRequest}},
};

/// A fetched (or loaded) week, with the dates needed to export it.
#[derive(Clone, Debug)]
pub struct LoadedWeek {
    pub week: WeekOption,
    pub class_id: u32,
    pub schedule: WeeklySchedule,
}

impl LoadedWeek {
    /// Day labels carry no year; the week's Monday anchors them.
    pub fn reference_date(&self) -> NaiveDate {
        self.week.monday
    }
}

pub fn make_source(opts: &SourceOptions) -> Result<HttpSource, Box<dyn Error>> {
    let source = HttpSource::new()?;
    Ok(if opts.use_cache { source } else { source.without_cache() })
}

/// Week `requested` nearest to `today`, or the current week.
pub fn resolve_week(requested: Option<u32>, today: NaiveDate) -> WeekOption {
    let Some(number) = requested else { return WeekOption::current(today) };

    if let Some(w) = week_candidates(today).into_iter().find(|w| w.number == number) {
        return w;
    }
    match NaiveDate::from_isoywd_opt(today.iso_week().year(), number, Weekday::Mon) {
        Some(monday) => WeekOption::containing(monday, today),
        None => {
            loge!("Runner: week {} does not exist this year, using current", number);
            WeekOption::current(today)
        }
    }
}

/// Fetch the configured week/class, or read `local_file` when set.
pub fn load(
    source: &dyn TimetableSource,
    opts: &SourceOptions,
    today: NaiveDate,
) -> Result<LoadedWeek, Box<dyn Error>> {
    let week = resolve_week(opts.week, today);

    let schedule = match &opts.local_file {
        Some(path) => {
            logf!("Runner: load {} as week {}", path.display(), week.number);
            timetable::load_file(path, &week.label())?
        }
        None => {
            logf!("Runner: fetch week {} class {}", week.number, opts.class_id);
            let req = TimetableRequest::new(week.number, opts.class_id).labelled(week.label());
            timetable::fetch(source, &req)?
        }
    };

    Ok(LoadedWeek { week, class_id: opts.class_id, schedule })
}

/// Filter, then write the whole week in the configured format.
/// Without an explicit output path the file is named `{class}_week_{n}`.
pub fn export(
    options: &AppOptions,
    loaded: &LoadedWeek,
    path_set: bool,
    stamp: NaiveDateTime,
) -> Result<(PathBuf, Rendered), Box<dyn Error>> {
    let mut export = options.export.clone();
    if !path_set {
        export.set_stem(&ics::week_file_stem(&loaded.schedule.class_name, loaded.week.number));
    }
    let visible = options.filter.apply(&loaded.schedule);
    file::write_export(&export, &visible, loaded.reference_date(), stamp)
}
