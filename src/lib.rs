// src/lib.rs
// #![allow(dead_code)]
// #![allow(unused)]

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod specs;

pub mod csv;
pub mod file;
pub mod filter;
pub mod gui;
pub mod ics;
pub mod progress;
pub mod runner;
pub mod slots;
