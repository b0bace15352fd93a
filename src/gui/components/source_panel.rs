// src/gui/components/source_panel.rs
//
// Week + class pickers and the FETCH button.
// Falls back to plain number fields until discovery has returned.

use eframe::egui;
use crate::gui::app::App;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.heading("Timetable");
    ui.add_space(4.0);

    let busy = app.busy();
    let source = &mut app.state.options.source;

    // --- Week ---
    ui.label("Week:");
    if app.catalog.weeks.is_empty() {
        let mut n = source.week.unwrap_or(0);
        ui.horizontal(|ui| {
            if ui.add(egui::DragValue::new(&mut n).range(0..=53)).changed() {
                source.week = if n == 0 { None } else { Some(n) };
                logd!("UI: week → {:?}", source.week);
            }
            if source.week.is_none() {
                ui.weak("current");
            }
        });
    } else {
        let selected = source
            .week
            .and_then(|n| app.catalog.week(n))
            .map(|w| w.display())
            .unwrap_or_else(|| s!("Current week"));

        egui::ComboBox::from_id_salt("week")
            .selected_text(selected)
            .width(180.0)
            .show_ui(ui, |ui| {
                for w in &app.catalog.weeks {
                    let mut text = format!("{}  (week {})", w.display(), w.number);
                    if w.is_current {
                        text.push_str(" •");
                    }
                    if ui.selectable_value(&mut source.week, Some(w.number), text).changed() {
                        logd!("UI: week → {}", w.number);
                    }
                }
            });
    }

    // --- Class ---
    ui.label("Class:");
    if app.catalog.classes.is_empty() {
        if ui.add(egui::DragValue::new(&mut source.class_id).range(1..=99_999)).changed() {
            logd!("UI: class → {}", source.class_id);
        }
    } else {
        let selected = app
            .catalog
            .class_label(source.class_id)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Class {}", source.class_id));

        egui::ComboBox::from_id_salt("class")
            .selected_text(selected)
            .width(180.0)
            .show_ui(ui, |ui| {
                egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                    for c in &app.catalog.classes {
                        if ui.selectable_value(&mut source.class_id, c.id, &c.label).changed() {
                            logd!("UI: class → {} ({})", c.id, c.label);
                        }
                    }
                });
            });
    }

    ui.checkbox(&mut source.use_cache, "Use cache");

    ui.label("Local file (optional):");
    ui.add(
        egui::TextEdit::singleline(&mut app.local_file_text)
            .hint_text("saved .htm page")
            .font(egui::TextStyle::Monospace),
    );

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        let red = egui::Color32::from_rgb(220, 30, 30);
        let fetch = egui::Button::new(egui::RichText::new("FETCH").color(egui::Color32::BLACK).strong()).fill(red);
        if ui.add_enabled(!busy, fetch).clicked() {
            app.fetch();
        }
        if ui.add_enabled(!busy, egui::Button::new("Discover")).clicked() {
            let use_cache = app.state.options.source.use_cache;
            app.discover(use_cache);
        }
        if busy {
            ui.spinner();
        }
    });

    if let Some(week) = app.catalog.scanned_week {
        ui.weak(format!("Classes listed from week {week}"));
    }
}
