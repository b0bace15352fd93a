// src/bin/cli.rs
use color_eyre::eyre::eyre;
use urnik_scrape::{cli, config::consts::LOG_FILE, log};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    log::init(LOG_FILE);
    cli::run().map_err(|e| eyre!("{e}"))
}
