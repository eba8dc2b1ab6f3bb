use std::process::ExitCode;

use tokio::sync::watch;
use tokio::task::JoinError;

pub mod config;
use config::app_config::{AppConfig, load_config};
pub mod dns;
use dns::prelude::*;
pub mod error;
use error::MonitorError;
pub mod http_probe;
use http_probe::prelude::*;
pub mod probe;
use probe::prelude::*;
pub mod prompt;
pub mod scheduler;
use scheduler::Scheduler;
pub mod sink;
use sink::{console::print_banner, prelude::*};

/// Take the domain from the configuration, or ask for it on stdin.
async fn target_domain(config: &AppConfig) -> std::io::Result<String> {
    if let Some(domain) = &config.domain {
        return Ok(domain.clone());
    }
    tokio::task::spawn_blocking(|| prompt::read_domain(std::io::stdin().lock(), std::io::stdout()))
        .await
        .map_err(std::io::Error::other)?
}

/// Flip the shutdown channel on Ctrl+C.
fn spawn_interrupt_handler(shutdown: watch::Sender<bool>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::info!("Interrupt received, shutting down");
                let _ = shutdown.send(true);
            }
            Err(e) => {
                // Without a handler the process can only be killed; keep the
                // sender alive so the loop does not read this as shutdown.
                log::warn!("Cannot listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    });
}

/// Map the end of the monitor task to an exit code. A fault is logged and
/// appended to the log file as a `CRITICAL ERROR` line when possible.
fn exit_status(
    outcome: Result<Result<u64, MonitorError>, JoinError>,
    critical_log: &LogFileSink,
) -> ExitCode {
    let fatal = match outcome {
        Ok(Ok(sweeps)) => {
            log::info!("Stopped after {sweeps} sweeps");
            return ExitCode::SUCCESS;
        }
        Ok(Err(e)) => e,
        Err(join_error) => MonitorError::from(join_error),
    };

    log::error!("Monitoring stopped: {fatal}");
    if let Err(e) = critical_log.append_critical(&fatal.to_string()) {
        log::error!("Could not record the failure: {e}");
    }
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app_config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let domain = match target_domain(&app_config).await {
        Ok(domain) => domain,
        Err(e) => {
            log::error!("No domain to monitor: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_sink = match LogFileSink::open(&app_config.log_file) {
        Ok(sink) => sink,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let critical_log = log_sink.clone();

    let resolvers = app_config.resolver_labels();
    let console_sink = ConsoleSink::new(&resolvers);
    print_banner(&app_config, &domain);

    let executor = ProbeExecutor::new(
        ResolverTimer::new(app_config.dns),
        HttpTimer::new(app_config.http.clone()),
    );
    let scheduler = Scheduler::new(executor, resolvers, app_config.interval);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    spawn_interrupt_handler(shutdown_tx);

    let monitor = tokio::spawn(async move {
        let mut sinks = (log_sink, console_sink);
        scheduler.run(&domain, &mut sinks, shutdown_rx).await
    });

    exit_status(monitor.await, &critical_log)
}
