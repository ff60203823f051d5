//! The `userdir::cli` module is used to serve the userdir application.
//! This module basically accepts options from command-line and starts a server up.

use clap::{Parser, Subcommand};
use sysexits::ExitCode;

use crate::{EXIT_CODE_INSUFFICIENT_PARAMS, VERSION};

pub mod command;
pub mod config;

#[derive(Parser)]
#[command(
    version = VERSION,
    disable_help_subcommand = true,
    about = "A small user directory service with a RESTful CRUD API and Prometheus-style metrics exposition."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    Server(command::server::Server),
    Status(command::status::Status),
}

impl Commands {
    pub fn execute(&mut self) -> ExitCode {
        match self {
            Commands::Server(server) => server.execute(),
            Commands::Status(status) => status.execute(),
        }
    }
}

impl Cli {
    /// Do real jobs.
    #[inline]
    pub fn run(&mut self) -> ExitCode {
        if let Some(ref mut cmd) = &mut self.command {
            return cmd.execute();
        }

        EXIT_CODE_INSUFFICIENT_PARAMS
    }
}
