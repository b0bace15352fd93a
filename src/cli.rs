// src/cli.rs
use std::{env, error::Error, path::PathBuf};

use chrono::{Local, Utc};

use crate::config::options::{AppOptions, ExportFormat};
use crate::core::net::TimetableSource;
use crate::engine::WeeklySchedule;
use crate::progress::StderrProgress;
use crate::runner::{self, LoadedWeek};
use crate::slots;
use crate::specs::catalog;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Print,
    Export,
    ListWeeks,
    ListClasses,
    Help,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliArgs {
    pub action: Action,
    pub options: AppOptions,
    /// `-o` given; otherwise the file is named after class and week.
    pub path_set: bool,
    pub label: Option<String>,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self { action: Action::Print, options: AppOptions::default(), path_set: false, label: None }
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let args = parse_args(env::args().skip(1))?;
    if args.action == Action::Help {
        eprintln!("{}", include_str!("cli_help.txt"));
        return Ok(());
    }

    let today = Local::now().date_naive();
    let source = runner::make_source(&args.options.source)?;

    match args.action {
        Action::ListWeeks => {
            let weeks = catalog::discover_weeks(&source, today, &mut StderrProgress::new());
            for w in weeks {
                let mark = if w.is_current { " *" } else { "" };
                println!("{}\t{}\t{}{}", w.number, w.label(), w.display(), mark);
            }
        }
        Action::ListClasses => {
            let week = args.options.source.week.unwrap_or_else(|| runner::resolve_week(None, today).number);
            for c in catalog::discover_classes(&source, week, &mut StderrProgress::new()) {
                println!("{}\t{}", c.id, c.label);
            }
        }
        Action::Print | Action::Export => {
            let loaded = load(&source, &args, today)?;
            if args.action == Action::Print {
                let visible = args.options.filter.apply(&loaded.schedule);
                print!("{}", render_text(&visible));
            } else {
                let (path, rendered) = runner::export(&args.options, &loaded, args.path_set, Utc::now().naive_utc())?;
                for why in &rendered.skipped {
                    eprintln!("skipped: {why}");
                }
                eprintln!("Wrote {} item(s) to {}", rendered.items, path.display());
            }
        }
        Action::Help => {}
    }
    Ok(())
}

fn load(source: &dyn TimetableSource, args: &CliArgs, today: chrono::NaiveDate) -> Result<LoadedWeek, Box<dyn Error>> {
    let mut loaded = runner::load(source, &args.options.source, today)?;
    if let Some(label) = &args.label {
        loaded.schedule.week_label = label.clone();
    }
    if loaded.schedule.days.is_empty() {
        eprintln!("No timetable found on the page.");
    }
    Ok(loaded)
}

pub fn parse_args<I: IntoIterator<Item = String>>(argv: I) -> Result<CliArgs, Box<dyn Error>> {
    let mut out = CliArgs::default();
    let mut format_set = false;
    let mut args = argv.into_iter();

    while let Some(a) = args.next() {
        match a.as_str() {
            "-w" | "--week" => {
                let v: u32 = args.next().ok_or("Missing value for --week")?.parse()?;
                if !(1..=53).contains(&v) { return Err("Week out of range (1..53)".into()); }
                out.options.source.week = Some(v);
            }
            "-c" | "--class" => {
                let v: u32 = args.next().ok_or("Missing class id")?.parse()?;
                if v == 0 || v > 99_999 { return Err("Class id out of range (1..99999)".into()); }
                out.options.source.class_id = v;
            }
            "--file" => out.options.source.local_file = Some(PathBuf::from(args.next().ok_or("Missing path for --file")?)),
            "--label" => out.label = Some(args.next().ok_or("Missing value for --label")?),
            "--no-cache" => out.options.source.use_cache = false,
            "--skupina" => {
                let v = args.next().ok_or("Missing value for --skupina")?;
                let (subject, group) = parse_preference(&v)?;
                out.options.filter.select(&subject, Some(group));
            }
            "--hide" => {
                let v = args.next().ok_or("Missing subject for --hide")?;
                out.options.filter.set_hidden(v.trim(), true);
            }
            "--format" => {
                let v = args.next().ok_or("Missing value for --format")?;
                out.options.export.format = ExportFormat::parse(&v)
                    .ok_or_else(|| format!("Unknown format: {}", v))?;
                format_set = true;
            }
            "-o" | "--out" => {
                let v = args.next().ok_or("Missing output path")?;
                out.options.export.set_path(&v);
                out.path_set = true;
            }
            "--no-headers" => out.options.export.include_headers = false,
            "--list-weeks" => out.action = Action::ListWeeks,
            "--list-classes" => out.action = Action::ListClasses,
            "-h" | "--help" => out.action = Action::Help,
            _ => return Err(format!("Unknown arg: {}", a).into()),
        }
    }

    if out.action == Action::Print && (format_set || out.path_set) {
        out.action = Action::Export;
    }
    Ok(out)
}

/// `"RSR lv=2"` → ("RSR lv", 2)
fn parse_preference(s: &str) -> Result<(String, u8), Box<dyn Error>> {
    let (subject, group) = s.rsplit_once('=').ok_or_else(|| format!("Expected SUBJECT=N, got {s:?}"))?;
    let subject = subject.trim();
    if subject.is_empty() { return Err(format!("Empty subject in {s:?}").into()); }
    Ok((s!(subject), group.trim().parse()?))
}

/// Plain-text week for the terminal.
pub fn render_text(schedule: &WeeklySchedule) -> String {
    let mut out = String::new();
    let title = if schedule.class_name.is_empty() { "?" } else { &schedule.class_name };
    out.push_str(&format!("{} · {}\n", title, schedule.week_label));

    for day in &schedule.days {
        out.push_str(&format!("\n{}\n", day.label));
        if let Some(note) = &day.note {
            out.push_str(&format!("  ({note})\n"));
            continue;
        }
        if day.classes.is_empty() {
            out.push_str("  -\n");
        }
        for c in &day.classes {
            let mut line = format!(
                "  {:>2}  {:<11}  {}",
                c.time_slot,
                slots::time_range(c.time_slot, c.duration_slots),
                c.subject
            );
            if let Some(label) = &c.sub_group_label { line.push_str(&format!(" [{label}]")); }
            if let Some(t) = &c.teacher { line.push_str(&format!(", {t}")); }
            if let Some(r) = &c.room { line.push_str(&format!(", uč. {r}")); }
            if let Some(n) = &c.special_note { line.push_str(&format!(" ({n})")); }
            if c.resolution.is_guess() { line.push_str(" ?"); }
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}
