// src/gui/components/filter_panel.rs
//
// Per-subject skupina preference and hidden subjects.
// Choices are listed from the loaded week only.

use eframe::egui;
use crate::{filter, gui::app::App};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.heading("Filter");

    ui.checkbox(&mut app.state.gui.apply_filter, "Apply to view and export");
    ui.checkbox(&mut app.state.gui.show_guesses, "Mark guessed columns");

    let Some(loaded) = app.loaded.as_ref() else {
        ui.weak("Fetch a week to choose groups");
        return;
    };

    let groups = filter::subgroups_by_subject(&loaded.schedule);
    let subjects = filter::subjects(&loaded.schedule);
    let prefs = &mut app.state.options.filter;

    // Keep scroll bars from overlaying the checkboxes
    {
        let s = &mut ui.style_mut().spacing.scroll;
        s.floating = false;
        s.bar_width = 10.0;
    }

    egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        if !groups.is_empty() {
            ui.add_space(4.0);
            ui.strong("Skupina");
            egui::Grid::new("skupine").num_columns(2).striped(true).show(ui, |ui| {
                for (subject, numbers) in &groups {
                    ui.label(subject);

                    let current = prefs.selected.get(subject).copied();
                    let mut pick = current;
                    egui::ComboBox::from_id_salt(("skupina", subject))
                        .selected_text(match pick {
                            Some(g) => format!("Skupina {g}"),
                            None => s!("All"),
                        })
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut pick, None, "All");
                            for g in numbers {
                                ui.selectable_value(&mut pick, Some(*g), format!("Skupina {g}"));
                            }
                        });
                    if pick != current {
                        logf!("UI: {} skupina → {:?}", subject, pick);
                        prefs.select(subject, pick);
                    }
                    ui.end_row();
                }
            });
        }

        ui.add_space(4.0);
        ui.strong("Subjects");
        for subject in &subjects {
            let mut shown = !prefs.hidden_subjects.contains(subject);
            if ui.checkbox(&mut shown, subject).changed() {
                logd!("UI: {} hidden → {}", subject, !shown);
                prefs.set_hidden(subject, !shown);
            }
        }

        if !prefs.is_empty() && ui.button("Reset filter").clicked() {
            *prefs = Default::default();
            logf!("UI: filter reset");
        }
    });
}
