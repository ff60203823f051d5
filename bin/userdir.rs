use std::process::ExitCode;

use clap::Parser;
use userdir::cli::Cli;

fn main() -> ExitCode {
    let mut cli = Cli::parse();
    cli.run().into()
}
