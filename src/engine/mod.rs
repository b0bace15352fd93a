// src/engine/mod.rs
pub mod extract;
pub mod grid;
pub mod types;

pub use extract::{extract, ScheduleExtractor};
pub use grid::{CellGridResolver, Resolution};
pub use types::{ClassEntry, DayBlock, WeeklySchedule};
