//! blasmodcli - manage Blasphemous and Blasphemous 2 mods from the terminal

use std::process::ExitCode;

use blasmod::cli::{self, Cli};
use clap::Parser;

fn main() -> ExitCode {
    cli::run(Cli::parse())
}
