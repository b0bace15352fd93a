// src/gui/components/export_bar.rs

use chrono::Utc;
use eframe::egui;
use crate::{
    config::options::ExportFormat,
    file,
    gui::app::App,
    runner,
};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    {
        let export = &mut app.state.options.export;

        // --- Format + Include headers ---
        let prev_fmt = export.format;
        ui.horizontal(|ui| {
            ui.label("Format:");
            for f in ExportFormat::ALL {
                ui.selectable_value(&mut export.format, f, f.label());
            }

            let tabular = export.format.delim().is_some();
            let before_headers = export.include_headers;
            ui.add_enabled(tabular, egui::Checkbox::new(&mut export.include_headers, "Include headers"));
            if export.include_headers != before_headers {
                logf!("UI: Include_headers → {}", export.include_headers);
            }
        });

        if export.format != prev_fmt {
            logf!("UI: Export format → {:?}", export.format);
            if !app.out_path_dirty {
                app.out_path_text = export.out_path().to_string_lossy().into_owned();
            }
        }
    }

    // --- Output field ---
    ui.horizontal(|ui| {
        ui.label("Output:");
        if ui
            .add(egui::TextEdit::singleline(&mut app.out_path_text)
                .font(egui::TextStyle::Monospace)
                .desired_width(360.0))
            .changed()
        {
            app.out_path_dirty = true;
            logd!("UI: out_path_text changed (dirty=true) → {}", app.out_path_text);
        }
        if !app.out_path_custom && !app.out_path_dirty {
            ui.weak("(named after class and week)");
        }
    });

    // --- Actions (Copy / Export) ---
    ui.horizontal(|ui| {
        if ui.button("Copy").clicked() {
            copy(ui, app);
        }
        if ui.button("Export").clicked() {
            export(app);
        }

        let status = app.status.lock().unwrap().clone();
        ui.label(format!("Status: {status}"));
    });
}

fn copy(ui: &egui::Ui, app: &App) {
    let (Some(loaded), Some(visible)) = (app.loaded.as_ref(), app.visible_schedule()) else {
        app.status("Nothing to copy");
        logd!("Copy: Clicked, but there's nothing to copy");
        return;
    };

    let export = &app.state.options.export;
    match file::render_export(export, &visible, loaded.reference_date(), Utc::now().naive_utc()) {
        Ok(rendered) => {
            logf!("Copy: format={:?} items={}", export.format, rendered.items);
            ui.ctx().copy_text(rendered.text);
            app.status(format!("Copied {} item(s) as {}", rendered.items, export.format.label()));
        }
        Err(e) => {
            loge!("Copy: Error: {}", e);
            app.status(format!("Copy error: {e}"));
        }
    }
}

fn export(app: &mut App) {
    app.commit_out_path();

    let Some(loaded) = app.loaded.as_ref() else {
        app.status("Nothing to export");
        logd!("Export: Clicked, but there's nothing to export");
        return;
    };

    let mut options = app.state.options.clone();
    if !app.state.gui.apply_filter {
        options.filter = Default::default();
    }

    logf!("Export: Begin format={:?} classes={}", options.export.format, loaded.schedule.class_count());
    match runner::export(&options, loaded, app.out_path_custom, Utc::now().naive_utc()) {
        Ok((path, rendered)) => {
            for why in &rendered.skipped {
                loge!("Export: skipped {}", why);
            }
            let mut msg = format!("Exported {} item(s) → {}", rendered.items, path.display());
            if !rendered.skipped.is_empty() {
                msg.push_str(&format!(" ({} skipped, see log)", rendered.skipped.len()));
            }
            app.status(msg);
        }
        Err(e) => {
            loge!("Export: Error: {}", e);
            app.status(format!("Export error: {e}"));
        }
    }
}
