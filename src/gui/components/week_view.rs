// src/gui/components/week_view.rs
//
// One table per day. Purely a view, except the per-class ICS button
// which writes into the export directory.

use chrono::{Datelike, Utc};
use eframe::egui::{self, Color32, RichText};
use egui_extras::{Column, TableBuilder};

use crate::{
    engine::{ClassEntry, DayBlock},
    file,
    gui::app::App,
    slots,
};

const ROW_H: f32 = 22.0;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let Some(schedule) = app.visible_schedule() else {
        ui.centered_and_justified(|ui| {
            ui.weak("No timetable loaded");
        });
        return;
    };

    // Today's day is highlighted only when the loaded week is this week
    let today = app
        .loaded
        .as_ref()
        .filter(|l| l.week.is_current)
        .map(|_| app.today.weekday());
    let show_guesses = app.state.gui.show_guesses;

    {
        let s = &mut ui.style_mut().spacing.scroll;
        s.floating = false;
        s.bar_width = 10.0;
        s.bar_inner_margin = 7.0;
        s.handle_min_length = 48.0;
    }

    ui.horizontal(|ui| {
        ui.heading(&schedule.class_name);
        ui.label(format!("Teden {}", schedule.week_label));
    });

    let mut wanted: Option<ClassEntry> = None;

    egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        for (idx, day) in schedule.days.iter().enumerate() {
            ui.add_space(6.0);
            let is_today = today.is_some() && day.weekday() == today;
            let mut title = RichText::new(&day.label).strong().size(16.0);
            if is_today {
                title = title.color(Color32::from_rgb(30, 110, 220));
            }
            ui.label(title);

            if let Some(note) = &day.note {
                ui.label(RichText::new(note).italics());
                continue;
            }
            if day.classes.is_empty() {
                ui.weak("No classes");
                continue;
            }

            if let Some(entry) = day_table(ui, idx, day, show_guesses) {
                wanted = Some(entry);
            }
        }
    });

    if let Some(entry) = wanted {
        save_entry(app, &schedule.class_name, &entry);
    }
}

/// Returns the entry whose ICS button was clicked.
fn day_table(ui: &mut egui::Ui, idx: usize, day: &DayBlock, show_guesses: bool) -> Option<ClassEntry> {
    let mut clicked = None;

    TableBuilder::new(ui)
        .id_salt(("day", idx))
        .striped(true)
        .vscroll(false)
        .column(Column::exact(14.0))
        .column(Column::initial(110.0).resizable(true).clip(true))
        .column(Column::initial(120.0).resizable(true).clip(true))
        .column(Column::initial(120.0).resizable(true).clip(true))
        .column(Column::initial(60.0).resizable(true).clip(true))
        .column(Column::initial(90.0).resizable(true).clip(true))
        .column(Column::remainder().at_least(80.0).clip(true))
        .column(Column::exact(40.0))
        .header(24.0, |mut header| {
            for title in ["", "Time", "Subject", "Teacher", "Room", "Skupina", "Note", ""] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for entry in &day.classes {
                body.row(ROW_H, |mut row| {
                    row.col(|ui| {
                        if let Some(c) = entry.background_color.as_deref().and_then(parse_hex) {
                            ui.colored_label(c, "■");
                        }
                    });
                    row.col(|ui| {
                        ui.label(slots::time_range(entry.time_slot, entry.duration_slots));
                    });
                    row.col(|ui| {
                        let mut text = RichText::new(&entry.subject).strong();
                        if show_guesses && entry.resolution.is_guess() {
                            text = text.color(Color32::from_rgb(200, 120, 0));
                        }
                        let resp = ui.label(text);
                        if show_guesses && entry.resolution.is_guess() {
                            resp.on_hover_text(format!("Column guessed ({:?})", entry.resolution));
                        }
                    });
                    row.col(|ui| {
                        ui.label(entry.teacher.as_deref().unwrap_or(""));
                    });
                    row.col(|ui| {
                        ui.label(entry.room.as_deref().unwrap_or(""));
                    });
                    row.col(|ui| {
                        ui.label(entry.sub_group_label.as_deref().unwrap_or(""));
                    });
                    row.col(|ui| {
                        ui.label(entry.special_note.as_deref().unwrap_or(""));
                    });
                    row.col(|ui| {
                        if ui.small_button("ICS").on_hover_text("Save this class as .ics").clicked() {
                            clicked = Some(entry.clone());
                        }
                    });
                });
            }
        });

    clicked
}

fn save_entry(app: &App, class_name: &str, entry: &ClassEntry) {
    let Some(loaded) = app.loaded.as_ref() else { return };
    let dir = app.state.options.export.dir();

    match file::write_entry_ics(dir, entry, class_name, loaded.reference_date(), Utc::now().naive_utc()) {
        Ok(path) => app.status(format!("Saved {}", path.display())),
        Err(e) => {
            loge!("Export: entry {} failed: {}", entry.subject, e);
            app.status(format!("Export error: {e}"));
        }
    }
}

/// `#RRGGBB` → colour. Untis writes upper-case hex.
fn parse_hex(s: &str) -> Option<Color32> {
    let hex = s.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}
