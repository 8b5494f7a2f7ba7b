// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::logger::{env_filter, LocalTimer};
use crate::modules::settings::cli::SETTINGS;
use crate::modules::settings::dir::DATA_DIR_MANAGER;
use std::sync::OnceLock;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;

/// Keeps the non-blocking writer flushing until the process exits.
pub static LOG_WORKER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

pub fn setup_file_logger(level: Level) -> Result<(), Box<dyn std::error::Error>> {
    let (server_nonb, server_guard) = server_log_writer()?;
    let _ = LOG_WORKER_GUARD.set(server_guard);

    let server_layer = fmt::layer()
        .with_timer(LocalTimer)
        .with_ansi(false)
        .with_level(true)
        .with_writer(server_nonb)
        .with_target(true);

    let registry = tracing_subscriber::registry().with(env_filter(level));
    if SETTINGS.rustmailbox_json_logs {
        tracing::subscriber::set_global_default(registry.with(server_layer.json()))?;
    } else {
        tracing::subscriber::set_global_default(registry.with(server_layer))?;
    }
    Ok(())
}

fn server_log_writer() -> Result<(NonBlocking, WorkerGuard), InitError> {
    let rolling = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("server")
        .max_log_files(SETTINGS.rustmailbox_max_server_log_files)
        .build(DATA_DIR_MANAGER.log_dir.clone())?;
    Ok(tracing_appender::non_blocking(rolling))
}
