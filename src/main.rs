use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    seatwatch_lib::run(seatwatch_lib::cli::Cli::parse())
}
