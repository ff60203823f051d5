//! This module provides different commands for the userdir application.
//! For instance, we have a 'server' command to indicate the application running in the server mode
//! and starts to accept HTTP request to do real userdir functionality.

use std::path::PathBuf;

use clap::{Args, ValueHint};

pub mod server;
pub mod status;

#[derive(Args, Default)]
#[group(required = false, multiple = true)]
pub struct CommandOptions {
    #[arg(
        long,
        next_line_help = true,
        value_name = "path",
        value_hint = ValueHint::FilePath,
        long_help = r#"Path to a configuration file, or a directory holding *.hcl or *.json
configuration fragments that are merged in directory order."#
    )]
    pub config: Option<PathBuf>,
}

#[derive(Args, Default)]
#[group(required = false, multiple = true)]
pub struct HttpOptions {
    #[arg(
        long,
        next_line_help = true,
        value_name = "string",
        default_value = "http://127.0.0.1:3000",
        env = "USERDIR_ADDR",
        long_help = r#"Address of the userdir server. This can also be specified via the
USERDIR_ADDR environment variable."#
    )]
    pub address: String,
}
