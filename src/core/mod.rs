// src/core/mod.rs

pub mod cache;
pub mod html;
pub mod net;
pub mod sanitize;

pub use net::{FetchError, HttpSource, StaticSource, TimetableSource};
