// src/gui/app.rs
use std::{
    error::Error,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::{Local, NaiveDate};
use eframe::egui;

use crate::{
    config::state::AppState,
    engine::WeeklySchedule,
    runner::LoadedWeek,
    specs::catalog::Catalog,
};

use super::worker::{Job, JobResult, Worker};

pub fn run(options: eframe::NativeOptions) -> Result<(), Box<dyn Error>> {
    eframe::run_native(
        "Urnik ŠC Kranj",
        options,
        Box::new(|cc| Ok(Box::new(App::new(cc, AppState::default())))),
    )?;
    Ok(())
}

pub struct App {
    // single source of truth (UI thread only)
    pub state: AppState,

    // discovered weeks/classes; empty until the first discovery returns
    pub catalog: Catalog,
    pub loaded: Option<LoadedWeek>,
    pub today: NaiveDate,

    // output text field UX (we map this <-> ExportOptions)
    pub out_path_text: String,
    pub out_path_dirty: bool,
    /// User typed a path; exports stop using `{class}_week_{n}`.
    pub out_path_custom: bool,

    pub local_file_text: String,

    // status/progress (worker writes here)
    pub status: Arc<Mutex<String>>,
    /// Jobs submitted and not yet answered.
    pub running: usize,

    worker: Option<Worker>,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState) -> Self {
        let status = Arc::new(Mutex::new(s!("Idle")));
        let out_path_text = state.options.export.out_path().to_string_lossy().into();

        let worker = match Worker::spawn(cc.egui_ctx.clone(), status.clone()) {
            Ok(w) => Some(w),
            Err(e) => {
                loge!("Init: worker failed: {}", e);
                *status.lock().unwrap() = format!("Network unavailable: {e}");
                None
            }
        };

        let mut app = Self {
            state,
            catalog: Catalog::default(),
            loaded: None,
            today: Local::now().date_naive(),
            out_path_text,
            out_path_dirty: false,
            out_path_custom: false,
            local_file_text: s!(),
            status,
            running: 0,
            worker,
        };
        logf!("Init: today={}", app.today);
        app.discover(true);
        app
    }

    /* ---------- tiny helpers ---------- */

    #[inline]
    pub fn status<T: Into<String>>(&self, msg: T) {
        *self.status.lock().unwrap() = msg.into();
    }

    #[inline]
    pub fn busy(&self) -> bool { self.running > 0 }

    /// What the week view and exports show: filtered unless the user turned that off.
    pub fn visible_schedule(&self) -> Option<WeeklySchedule> {
        let loaded = self.loaded.as_ref()?;
        Some(if self.state.gui.apply_filter {
            self.state.options.filter.apply(&loaded.schedule)
        } else {
            loaded.schedule.clone()
        })
    }

    /// Push the Output field into ExportOptions if it was edited.
    pub fn commit_out_path(&mut self) {
        if self.out_path_dirty {
            self.state.options.export.set_path(&self.out_path_text);
            self.out_path_custom = true;
            self.out_path_dirty = false;
            logf!("Export: Out path set → {}", self.state.options.export.out_path().display());
        }
    }

    fn submit(&mut self, job: Job) {
        let Some(worker) = &self.worker else {
            self.status("Network unavailable");
            return;
        };
        if worker.submit(job) {
            self.running += 1;
        } else {
            loge!("Worker: channel closed");
            self.status("Background worker stopped");
        }
    }

    pub fn fetch(&mut self) {
        let text = self.local_file_text.trim();
        self.state.options.source.local_file = if text.is_empty() { None } else { Some(PathBuf::from(text)) };

        let opts = self.state.options.source.clone();
        logf!("Fetch: week={:?} class={} cache={}", opts.week, opts.class_id, opts.use_cache);
        self.status("Fetching…");
        self.submit(Job::Load(opts));
    }

    pub fn discover(&mut self, use_cache: bool) {
        self.status("Discovering weeks and classes…");
        self.submit(Job::Discover { use_cache });
    }

    fn on_result(&mut self, result: JobResult) {
        self.running = self.running.saturating_sub(1);
        match result {
            JobResult::Loaded(Ok(loaded)) => {
                let s = &loaded.schedule;
                let guessed = s.guessed().count();
                logf!("Fetch: OK class={} classes={} guessed={}", s.class_name, s.class_count(), guessed);
                let mut msg = format!("Loaded {} ({}): {} class(es)", s.class_name, loaded.week.display(), s.class_count());
                if guessed > 0 {
                    msg.push_str(&format!(", {guessed} with a guessed column"));
                }
                self.status(msg);
                self.loaded = Some(loaded);
            }
            JobResult::Loaded(Err(e)) => {
                loge!("Fetch: Error: {}", e);
                self.status(format!("Error: {e}"));
            }
            JobResult::Catalog(catalog) => {
                logf!("Discover: weeks={} classes={}", catalog.weeks.len(), catalog.classes.len());
                let source = &mut self.state.options.source;
                if source.week.is_none() {
                    source.week = catalog.weeks.iter().find(|w| w.is_current).map(|w| w.number);
                }
                if !catalog.classes.is_empty() && catalog.class_label(source.class_id).is_none() {
                    source.class_id = catalog.classes[0].id;
                }
                self.status(if catalog.weeks.is_empty() {
                    s!("No published weeks found")
                } else {
                    format!("Found {} week(s), {} class(es)", catalog.weeks.len(), catalog.classes.len())
                });
                self.catalog = catalog;
            }
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Some(result) = self.worker.as_ref().and_then(Worker::poll) {
            self.on_result(result);
        }

        eframe::egui::SidePanel::left("source")
            .resizable(false)
            .show(ctx, |ui| {
                crate::gui::components::source_panel::draw(ui, self);

                ui.separator();

                crate::gui::components::filter_panel::draw(ui, self);
            });

        eframe::egui::CentralPanel::default().show(ctx, |ui| {
            crate::gui::components::export_bar::draw(ui, self);

            ui.separator();

            crate::gui::components::week_view::draw(ui, self);
        });
    }
}
