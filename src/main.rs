//! Adaptfind CLI: walk folders and print matching paths.

use adaptfind::engine::arg_parser::Cli;
use adaptfind::engine::handle_run;
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> Result<ExitCode> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let code = handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(code)
}
