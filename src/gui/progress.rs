// src/gui/progress.rs
use std::sync::{ Arc, Mutex };
use crate::progress::Progress;

/// Mirrors discovery progress into the shared status line.
pub struct GuiProgress {
    status: Arc<Mutex<String>>,
    phase: String,
    done: usize,
    total: usize,
}

impl GuiProgress {
    pub fn new(status: Arc<Mutex<String>>) -> Self {
        Self { status, phase: s!(), done: 0, total: 0 }
    }
    fn set_status(&self, msg: impl Into<String>) {
        if let Ok(mut s) = self.status.lock() {
            *s = msg.into();
        }
    }
}

impl Progress for GuiProgress {
    fn begin(&mut self, total: usize) {
        self.done = 0;
        self.total = total;
    }
    fn log(&mut self, msg: &str) {
        self.phase = s!(msg);
        self.set_status(s!(msg));
    }
    fn item_done(&mut self, _id: u32) {
        self.done += 1;
        self.set_status(format!("{} ({}/{})", self.phase, self.done, self.total));
    }
    fn finish(&mut self) {
        self.set_status(s!("Discovery complete"));
    }
}
