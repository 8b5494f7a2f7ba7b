// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::logger::file::setup_file_logger;
use crate::modules::settings::cli::SETTINGS;
use chrono::Local;
use std::process;
use tracing::Level;
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};
use tracing_subscriber::EnvFilter;

mod file;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

pub fn initialize_logging() {
    let level = validate_log_level(&SETTINGS.rustmailbox_log_level);
    let result = if SETTINGS.rustmailbox_log_to_file {
        setup_file_logger(level)
    } else {
        setup_stdout_logger(level)
    };
    if let Err(e) = result {
        eprintln!("Failed to install the log subscriber: {}", e);
        process::exit(1);
    }
}

/// `RUST_LOG` directives win over the configured level when present.
fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

fn setup_stdout_logger(level: Level) -> Result<(), Box<dyn std::error::Error>> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_ansi(SETTINGS.rustmailbox_ansi_logs)
        .with_writer(std::io::stdout)
        .with_level(true)
        .with_target(true)
        .with_timer(LocalTimer);

    if SETTINGS.rustmailbox_json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn validate_log_level(value: &str) -> Level {
    match value.parse::<Level>() {
        Ok(level) => level,
        Err(_) => {
            eprintln!(
                "Invalid log level specified. Use one of: error, warn, info, debug, trace. \
The log level you currently specified is 'rustmailbox_log_level'='{}'",
                value
            );
            process::exit(1);
        }
    }
}
