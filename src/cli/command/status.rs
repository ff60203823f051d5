use anyhow::anyhow;
use clap::Parser;
use derive_more::Deref;
use sysexits::ExitCode;

use crate::{cli::command, errors::UdError, EXIT_CODE_INSUFFICIENT_PARAMS, EXIT_CODE_OK};

#[derive(Parser, Deref)]
#[command(
    author,
    version,
    about = r#"Prints the current state of a running userdir server, derived from its
metrics exposition endpoint."#
)]
pub struct Status {
    #[deref]
    #[command(flatten, next_help_heading = "HTTP Options")]
    http_options: command::HttpOptions,
}

impl Status {
    #[inline]
    pub fn execute(&mut self) -> ExitCode {
        return (self.main().is_ok()).then(|| EXIT_CODE_OK).unwrap_or(EXIT_CODE_INSUFFICIENT_PARAMS);
    }

    pub fn main(&self) -> Result<(), UdError> {
        let url = format!("{}/metrics", self.address.trim_end_matches('/'));
        let body = ureq::get(&url)
            .call()
            .map_err(|e| UdError::ErrOther(anyhow!("request to {} failed: {}", url, e)))?
            .into_string()?;

        let requests: u64 = body
            .lines()
            .filter(|line| line.starts_with("http_requests_total{"))
            .filter_map(|line| line.rsplit(' ').next())
            .filter_map(|v| v.parse::<u64>().ok())
            .sum();

        println!("userdir server is up, {} user requests handled", requests);
        Ok(())
    }
}
