// src/gui/worker.rs
//
// One background thread owns the HTTP sources and the catalog cache.
// The UI sends jobs and polls results each frame; the thread pokes the
// UI with a repaint when something arrives.

use std::{
    error::Error,
    sync::{mpsc::{self, Receiver, Sender}, Arc, Mutex},
    thread,
};

use chrono::Local;
use eframe::egui;

use crate::{
    config::options::SourceOptions,
    core::net::HttpSource,
    gui::progress::GuiProgress,
    runner::{self, LoadedWeek},
    specs::catalog::{Catalog, CatalogCache},
};

pub enum Job {
    Load(SourceOptions),
    Discover { use_cache: bool },
}

pub enum JobResult {
    Loaded(Result<LoadedWeek, String>),
    Catalog(Catalog),
}

pub struct Worker {
    tx: Sender<Job>,
    rx: Receiver<JobResult>,
}

impl Worker {
    pub fn spawn(ctx: egui::Context, status: Arc<Mutex<String>>) -> Result<Self, Box<dyn Error>> {
        let cached = HttpSource::new()?;
        let uncached = HttpSource::new()?.without_cache();

        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (res_tx, res_rx) = mpsc::channel::<JobResult>();

        thread::Builder::new()
            .name(s!("urnik-worker"))
            .spawn(move || {
                let mut catalog = CatalogCache::new();
                // Ends when the UI drops its sender.
                for job in job_rx {
                    let today = Local::now().date_naive();
                    let result = match job {
                        Job::Load(opts) => {
                            let source = if opts.use_cache { &cached } else { &uncached };
                            JobResult::Loaded(
                                runner::load(source, &opts, today).map_err(|e| e.to_string()),
                            )
                        }
                        Job::Discover { use_cache } => {
                            let mut prog = GuiProgress::new(status.clone());
                            JobResult::Catalog(catalog.get_or_discover(&cached, today, &mut prog, use_cache))
                        }
                    };
                    if res_tx.send(result).is_err() {
                        break;
                    }
                    ctx.request_repaint();
                }
                logd!("Worker: exit");
            })?;

        Ok(Self { tx: job_tx, rx: res_rx })
    }

    pub fn submit(&self, job: Job) -> bool {
        self.tx.send(job).is_ok()
    }

    pub fn poll(&self) -> Option<JobResult> {
        self.rx.try_recv().ok()
    }
}
