#![deny(unused_must_use)]

mod cli;
mod commands;
mod scenario;

use crate::cli::PpsimOptions;
use anyhow::Result;
use clap::Parser;
use human_panic::setup_panic;
use log::error;

fn main() -> Result<()> {
    setup_panic!();

    let options = PpsimOptions::parse();

    // unwrap: will only fail if the logger is already initialized - which it clearly is not
    simple_logger::init_with_level(options.log_level).unwrap();

    if let Err(err) = commands::run::run(options) {
        error!("{err:#}");
        std::process::exit(1);
    }

    Ok(())
}
