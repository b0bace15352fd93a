// src/gui/components/mod.rs
pub mod export_bar;
pub mod filter_panel;
pub mod source_panel;
pub mod week_view;
