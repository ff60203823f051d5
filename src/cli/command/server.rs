use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use clap::Parser;
use derive_more::Deref;
use sysexits::ExitCode;
use tokio::sync::watch;

use crate::{
    cli::{command, config},
    errors::UdError,
    http,
    metrics::manager::MetricsManager,
    storage,
    users::manager::{UserManager, UserManagerOptions},
    EXIT_CODE_INSUFFICIENT_PARAMS, EXIT_CODE_LOAD_CONFIG_FAILURE, EXIT_CODE_OK,
};

pub const WORK_DIR_PATH_DEFAULT: &str = "/tmp/userdir";

#[derive(Parser, Deref)]
#[command(
    author,
    version,
    about = r#"This command starts a userdir server that responds to API requests. User
records are kept in the configured store, and every operation is counted in
the metric registry scraped through GET /metrics.

Start a server with a configuration file:

  $ userdir server --config=/etc/userdir/config.hcl"#
)]
pub struct Server {
    #[deref]
    #[command(flatten, next_help_heading = "Command Options")]
    command_options: command::CommandOptions,
}

impl Server {
    #[inline]
    pub fn execute(&mut self) -> ExitCode {
        if let Some(config_path) = &self.config {
            return match self.main(config_path) {
                Ok(_) => EXIT_CODE_OK,
                Err(e) => {
                    println!("server error: {:?}", e);
                    std::process::exit(EXIT_CODE_LOAD_CONFIG_FAILURE as i32);
                }
            };
        }

        EXIT_CODE_INSUFFICIENT_PARAMS
    }

    pub fn main(&self, config_path: &PathBuf) -> Result<(), UdError> {
        let config = config::load_config(&config_path.to_string_lossy())?;

        if config.storage.len() != 1 {
            return Err(UdError::ErrConfigStorageNotFound);
        }

        if config.listener.len() != 1 {
            return Err(UdError::ErrConfigListenerNotFound);
        }

        env::set_var("RUST_LOG", config.log_level.as_str());
        env_logger::init();

        let (_, storage) = config.storage.iter().next().unwrap();
        let (_, listener) = config.listener.iter().next().unwrap();

        let listener = listener.clone();

        let mut work_dir = WORK_DIR_PATH_DEFAULT.to_string();
        if !config.work_dir.is_empty() {
            work_dir.clone_from(&config.work_dir);
        }

        if !Path::new(work_dir.as_str()).exists() {
            log::info!("create work_dir: {}", work_dir);
            fs::create_dir_all(work_dir.as_str())?;
        }

        #[cfg(not(windows))]
        if config.daemon {
            // start daemon
            let log_path = format!("{}/userdir.log", work_dir);
            let mut pid_path = config.pid_file.clone();
            if !config.pid_file.starts_with('/') {
                pid_path = work_dir.clone() + pid_path.as_str();
            }

            let mut user = "nobody".to_owned();
            if !config.daemon_user.is_empty() {
                user.clone_from(&config.daemon_user);
            }

            let mut group = "nobody".to_owned();
            if !config.daemon_group.is_empty() {
                group.clone_from(&config.daemon_group);
            }

            let log_file = std::fs::OpenOptions::new()
                .read(true)
                .append(true)
                .create(true)
                .truncate(false)
                .open(log_path)?;

            let daemonize = daemonize::Daemonize::new()
                .working_directory(work_dir.as_str())
                .user(user.as_str())
                .group(group.as_str())
                .umask(0o027)
                .stdout(log_file.try_clone()?)
                .stderr(log_file)
                .pid_file(pid_path.clone())
                .chown_pid_file(true)
                .privileged_action(|| log::info!("Start userdir server daemon"));

            match daemonize.start() {
                Ok(_) => {
                    let pid = std::fs::read_to_string(pid_path)?;
                    log::info!("The userdir server daemon process started successfully, pid is {}", pid);
                    log::debug!("run user: {}, group: {}", user, group);
                }
                Err(e) => log::error!("Error, {}", e),
            }
        }

        log::debug!("config_path: {}, work_dir_path: {}", config_path.to_string_lossy(), work_dir.as_str());

        let server = actix_rt::System::new();

        let store = storage::new_store(storage.stype.as_str(), &storage.config)?;

        let metrics_manager =
            Arc::new(MetricsManager::new(config.collection_interval, config.instrument_exposition)?);
        let system_metrics = Arc::clone(&metrics_manager.system_metrics);

        let manager_opts = UserManagerOptions {
            strict_validation: config.strict_validation,
            partial_update: config.partial_update,
            return_deleted_body: config.return_deleted_body,
        };
        let user_manager =
            Arc::new(UserManager::new(store, Arc::clone(&metrics_manager.http_metrics), manager_opts));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let http_server = HttpServer::new(move || {
            App::new()
                .wrap(middleware::Logger::default())
                .app_data(web::Data::new(Arc::clone(&user_manager)))
                .app_data(web::Data::new(Arc::clone(&metrics_manager)))
                .configure(http::init_service)
                .default_service(web::to(HttpResponse::NotFound))
        });

        log::info!("start listen, addr: {}", listener.address);

        let http_server = http_server.bind(listener.address)?;

        log::info!("userdir server starts, waiting for request...");

        server.block_on(async {
            tokio::spawn(async move {
                system_metrics.start_collecting(shutdown_rx).await;
            });
            let ret = http_server.run().await;
            // no further sampler ticks once the server is going down
            let _ = shutdown_tx.send(true);
            ret
        })?;

        Ok(())
    }
}
