use std::process::ExitCode;

use clap::Parser;

use pexler::cli::{self, CliArgs};
use pexler::logger;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    logger::init();
    pexler::log_info!("CLI invoked: {:?}", std::env::args().collect::<Vec<_>>());
    cli::run(args)
}
