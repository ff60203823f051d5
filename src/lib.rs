//! This crate is the 'library' part of userdir, a small user directory
//! service whose API surface is instrumented end to end. userdir works in two
//! ways independently:
//!
//! 1. A standalone application serving user records via a RESTful API, with a
//!    Prometheus-style exposition endpoint for scraping;
//! 2. A Rust crate that provides the same features for other applications to
//!    integrate: an instrumented user manager over a pluggable store, plus
//!    the metric registry it reports into.
//!
//! For the first working mode, see the `userdir server` command. The second
//! working mode revolves around [`Userdir`], which bundles a configured
//! [`users::manager::UserManager`] together with its
//! [`metrics::manager::MetricsManager`].

use std::sync::Arc;

use crate::{
    cli::config::Config,
    errors::UdError,
    metrics::manager::MetricsManager,
    storage::UserStore,
    users::manager::{UserManager, UserManagerOptions},
};

pub mod cli;
pub mod errors;
pub mod http;
pub mod metrics;
pub mod storage;
pub mod users;
pub mod util;

#[cfg(test)]
pub mod test_utils;

/// Exit ok
pub const EXIT_CODE_OK: sysexits::ExitCode = sysexits::ExitCode::Ok;
/// Exit code when server exits unexpectedly
pub const EXIT_CODE_SERVER_EXIT_UNEXPECTEDLY: sysexits::ExitCode = sysexits::ExitCode::Software;
/// Exit code when loading configuration from file fails
pub const EXIT_CODE_LOAD_CONFIG_FAILURE: sysexits::ExitCode = sysexits::ExitCode::Config;
/// Exit code when insufficient params are passed via CLI
pub const EXIT_CODE_INSUFFICIENT_PARAMS: sysexits::ExitCode = sysexits::ExitCode::Usage;

/// Build timestamp in UTC
pub const BUILD_TIME: &str = build_time::build_time_utc!();

/// userdir version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct Userdir {
    pub user_manager: Arc<UserManager>,
    pub metrics_manager: Arc<MetricsManager>,
}

impl Userdir {
    pub fn new(store: Arc<dyn UserStore>, config: Option<&Config>) -> Result<Self, UdError> {
        let mut collection_interval = 5;
        let mut instrument_exposition = false;
        let mut opts = UserManagerOptions::default();

        if let Some(conf) = config {
            collection_interval = conf.collection_interval;
            instrument_exposition = conf.instrument_exposition;
            opts = UserManagerOptions {
                strict_validation: conf.strict_validation,
                partial_update: conf.partial_update,
                return_deleted_body: conf.return_deleted_body,
            };
        }

        let metrics_manager = Arc::new(MetricsManager::new(collection_interval, instrument_exposition)?);
        let user_manager = Arc::new(UserManager::new(store, Arc::clone(&metrics_manager.http_metrics), opts));

        Ok(Self { user_manager, metrics_manager })
    }
}
