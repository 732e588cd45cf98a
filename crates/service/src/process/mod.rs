use std::time::Duration;

use futures::future::join_all;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::{Config, ServiceState};

/// How long in-flight requests get to drain after a SIGTERM
const REQUEST_GRACE_PERIOD: Duration = Duration::from_secs(10);

const FINAL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Run the station service to completion: logging, state, API server,
/// graceful shutdown
pub async fn spawn_service(config: &Config) {
    let (stdout_writer, _stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let env_filter = EnvFilter::builder()
        .with_default_directive(config.log_level.into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_filter(env_filter);

    // rolling file logs are opt-in; the guard must outlive the service
    let (file_layer, _file_guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "station.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(
                    EnvFilter::builder()
                        .with_default_directive(config.log_level.into())
                        .from_env_lossy(),
                );
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    install_panic_logger();

    let build = common::prelude::build_info();
    tracing::info!(
        version = build.version,
        build_profile = build.build_profile,
        "station starting up"
    );

    let (shutdown_waiter, shutdown_rx) = match shutdown_watcher() {
        Ok(watcher) => watcher,
        Err(e) => {
            tracing::error!("error installing signal handlers: {}", e);
            std::process::exit(2);
        }
    };

    let state = match ServiceState::from_config(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("error creating server state: {}", e);
            std::process::exit(3);
        }
    };

    let mut handles = Vec::new();

    let listen_addr = config.listen_addr;
    let api_rx = shutdown_rx.clone();
    let api_handle = tokio::spawn(async move {
        if let Err(e) = crate::http::run(listen_addr, state, api_rx).await {
            tracing::error!("API server error: {}", e);
        }
    });
    handles.push(api_handle);

    let _ = shutdown_waiter.await;

    if timeout(FINAL_SHUTDOWN_TIMEOUT, join_all(handles))
        .await
        .is_err()
    {
        tracing::error!(
            "Failed to shut down within {} seconds",
            FINAL_SHUTDOWN_TIMEOUT.as_secs()
        );
        std::process::exit(4);
    }
}

/// Spawn a task that turns SIGINT and SIGTERM into a shutdown broadcast
///
/// SIGINT drops everything at once; SIGTERM waits out the request grace
/// period first so load balancers can drain us.
fn shutdown_watcher() -> std::io::Result<(JoinHandle<()>, watch::Receiver<()>)> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let (tx, rx) = watch::channel(());
    let handle = tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {
                tracing::debug!("shutting down immediately on SIGINT");
            }
            _ = sigterm.recv() => {
                tracing::debug!("SIGTERM received, draining in-flight requests");
                tokio::time::sleep(REQUEST_GRACE_PERIOD).await;
            }
        }

        let _ = tx.send(());
    });

    Ok((handle, rx))
}

/// Route panics through `tracing` so they land in the same sinks as
/// everything else
fn install_panic_logger() {
    std::panic::set_hook(Box::new(|panic| match panic.location() {
        Some(loc) => {
            tracing::error!(
                message = %panic,
                panic.file = loc.file(),
                panic.line = loc.line(),
                panic.column = loc.column(),
            );
        }
        None => tracing::error!(message = %panic),
    }));
}
