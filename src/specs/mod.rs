// src/specs/mod.rs
//! # Page specs
//!
//! One module per kind of remote page. A spec knows *where the page lives*
//! and *what to read out of it*; it does not decide when to fetch, how long
//! to keep results, or how to present them.
//!
//! ## What lives here
//! - **timetable**: one class, one week (`c/{week}/c{id:05}.htm`) turned into
//!   a `WeeklySchedule` by `engine::extract`.
//! - **catalog**: which weeks are published right now and which class ids
//!   exist, found by probing the same pages.
//!
//! ## What does **not** live here
//! - **Grid reconstruction / cell classification**: that is `engine`.
//! - **Filtering, export formatting, GUI concerns**: `filter`, `ics`, `csv`,
//!   `file`, `gui`.
//! - **HTTP and caching details**: behind `core::net::TimetableSource`, so
//!   every spec runs offline against a `StaticSource`.
//!
//! ## Typical call chain
//! ```text
//! GUI worker / cli → runner → specs::timetable::fetch(source, request)
//!                                   ↘ source.fetch_page(week, id)
//!                                   ↘ engine::extract(html, week_label)
//! ```
//!
//! ## Testing notes
//! - Feed captured pages through `StaticSource`; nothing here needs a network.
pub mod catalog;
pub mod timetable;
