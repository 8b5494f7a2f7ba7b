// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use clap::{builder::ValueParser, Parser};
use std::{collections::HashSet, path::PathBuf, sync::LazyLock};
use url::Url;

use crate::modules::envelope::text::GenerateText;

#[cfg(not(test))]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::parse);

#[cfg(test)]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new_for_test);

#[derive(Debug, Parser)]
#[clap(
    name = "rustmailbox",
    about = "A self-contained mailbox service: ingests inbound mail, groups it into threads,
    and exposes a REST surface for reading, composing, sending, trashing and deleting emails.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Settings {
    /// Region the deployment runs in; also forms the default outbound Message-ID domain.
    #[clap(long, env, default_value = "us-east-1", help = "Set the deployment region")]
    pub region: String,

    /// Name of the metadata table.
    #[clap(
        long,
        env,
        default_value = "mailbox",
        help = "Set the metadata table name",
        value_parser = ValueParser::new(|s: &str| -> Result<String, String> {
            if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.') {
                return Err("Table name may only contain letters, digits, '-', '_' and '.'".to_string());
            }
            Ok(s.to_string())
        })
    )]
    pub dynamodb_table: String,

    /// Name of the time index (partition `TypeYearMonth`, sort `DateTime`).
    #[clap(long, env, default_value = "TimeIndex", help = "Set the time index name")]
    pub dynamodb_time_index: String,

    /// Name of the original message-id index.
    #[clap(
        long,
        env,
        default_value = "OriginalMessageIDIndex",
        help = "Set the original message-id index name"
    )]
    pub dynamodb_original_index: String,

    /// Bucket holding raw MIME objects keyed by message ID.
    #[clap(
        long,
        env,
        default_value = "mailbox-raw",
        help = "Set the blob bucket name",
        value_parser = ValueParser::new(|s: &str| -> Result<String, String> {
            if s.is_empty() || s.contains('/') || s.contains('\\') || s == "." || s == ".." {
                return Err("Bucket name must be a single path segment".to_string());
            }
            Ok(s.to_string())
        })
    )]
    pub s3_bucket: String,

    /// Queue (NATS JetStream stream) that receives state-change notifications.
    #[clap(long, env, help = "Set the notification queue name (optional)")]
    pub sqs_queue: Option<String>,

    /// Webhook that receives state-change notifications.
    #[clap(
        long,
        env,
        help = "Set the notification webhook URL (optional)",
        value_parser = ValueParser::new(|s: &str| -> Result<String, String> {
            Url::parse(s).map_err(|_| format!("Invalid URL for webhook_url: {}", s))?;
            Ok(s.to_string())
        })
    )]
    pub webhook_url: Option<String>,

    /// rustmailbox log level (default: "info")
    #[clap(
        long,
        default_value = "info",
        env,
        help = "Set the log level for rustmailbox"
    )]
    pub rustmailbox_log_level: String,

    /// Enable ANSI logs (default: true)
    #[clap(long, default_value = "true", env, help = "Enable ANSI formatted logs")]
    pub rustmailbox_ansi_logs: bool,

    /// Enable JSON logs (default: false)
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable JSON formatted logs"
    )]
    pub rustmailbox_json_logs: bool,

    /// If false, logs will be printed to stdout
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable log file output (otherwise logs go to stdout)"
    )]
    pub rustmailbox_log_to_file: bool,

    #[clap(
        long,
        default_value = "5",
        env,
        help = "Set the maximum number of server log files"
    )]
    pub rustmailbox_max_server_log_files: usize,

    /// rustmailbox HTTP port (default: 15630)
    #[clap(
        long,
        default_value = "15630",
        env,
        help = "Set the HTTP port for rustmailbox"
    )]
    pub rustmailbox_http_port: u16,

    #[clap(
        long,
        env,
        default_value = "0.0.0.0",
        help = "The IP address that the HTTP server binds to, in IPv4 format (e.g., 192.168.1.1).",
        value_parser = ValueParser::new(|s: &str| {
            if s.parse::<std::net::Ipv4Addr>().is_err() {
                return Err("The bind IP address must be a valid IPv4 address.".to_string());
            }
            Ok(s.to_string())
        })
    )]
    pub rustmailbox_bind_ip: String,

    #[clap(
        long,
        default_value = "*",
        env,
        help = "Set the allowed CORS origins (comma-separated list, e.g., \"https://example.com, https://another.com\")",
        value_parser = ValueParser::new(|s: &str| -> Result<HashSet<String>, String> {
            let set: HashSet<String> = s.split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
            Ok(set)
        })
    )]
    pub rustmailbox_cors_origins: HashSet<String>,

    /// CORS max age in seconds (default: 86400)
    #[clap(
        long,
        default_value = "86400",
        env,
        help = "Set the CORS max age in seconds"
    )]
    pub rustmailbox_cors_max_age: i32,

    #[clap(
        long,
        default_value = "true",
        env,
        help = "Enable HTTP response compression"
    )]
    pub rustmailbox_http_compression_enabled: bool,

    /// Deadline applied to every request unless the caller overrides it by header.
    #[clap(
        long,
        default_value = "10",
        env,
        help = "Set the default request deadline in seconds",
        value_parser = clap::value_parser!(u64).range(1..=600)
    )]
    pub rustmailbox_request_timeout_seconds: u64,

    #[clap(
        long,
        env,
        help = "Set the data directory holding the metadata database and the blob store",
        value_parser = ValueParser::new(|s: &str| {
            let path = PathBuf::from(s);
            if !path.is_absolute() {
                return Err("Path must be an absolute directory path".to_string());
            }
            Ok(s.to_string())
        })
    )]
    pub rustmailbox_root_dir: String,

    #[clap(
        long,
        default_value = "false",
        env,
        help = "Keep the metadata table in memory (contents are lost on restart)"
    )]
    pub rustmailbox_metadata_memory_mode_enabled: bool,

    #[clap(
        long,
        env,
        default_value = "134217728",
        help = "Set the cache size for the metadata database in bytes"
    )]
    pub rustmailbox_metadata_cache_size: usize,

    #[clap(
        long,
        env,
        default_value = "nats://localhost:4222",
        help = "Set the NATS server used for queue notifications"
    )]
    pub rustmailbox_nats_url: String,

    #[clap(long, env, help = "Set the NATS username (optional)")]
    pub rustmailbox_nats_username: Option<String>,

    #[clap(long, env, help = "Set the NATS password (optional)")]
    pub rustmailbox_nats_password: Option<String>,

    /// Whether text bodies are generated from HTML on ingestion.
    #[clap(
        long,
        env,
        value_enum,
        default_value = "auto",
        help = "Generate a text body from HTML: auto (only when text is empty), on, off"
    )]
    pub rustmailbox_generate_text: GenerateText,

    #[clap(long, env, default_value = "localhost", help = "Set the outbound SMTP host")]
    pub rustmailbox_smtp_host: String,

    #[clap(long, env, default_value = "587", help = "Set the outbound SMTP port")]
    pub rustmailbox_smtp_port: u16,

    #[clap(long, env, help = "Set the outbound SMTP username (optional)")]
    pub rustmailbox_smtp_username: Option<String>,

    #[clap(long, env, help = "Set the outbound SMTP password (optional)")]
    pub rustmailbox_smtp_password: Option<String>,

    #[clap(
        long,
        default_value = "true",
        env,
        help = "Use implicit TLS for the outbound SMTP connection"
    )]
    pub rustmailbox_smtp_tls: bool,

    /// Domain used in generated outbound Message-IDs (default: `<region>.amazonses.com`).
    #[clap(long, env, help = "Set the domain used in outbound Message-ID headers")]
    pub rustmailbox_message_id_domain: Option<String>,
}

impl Settings {
    pub fn message_id_domain(&self) -> String {
        self.rustmailbox_message_id_domain
            .clone()
            .unwrap_or_else(|| format!("{}.amazonses.com", self.region))
    }

    #[cfg(test)]
    pub fn new_for_test() -> Self {
        Self {
            region: "us-west-2".into(),
            dynamodb_table: "mailbox-test".into(),
            dynamodb_time_index: "TimeIndex".into(),
            dynamodb_original_index: "OriginalMessageIDIndex".into(),
            s3_bucket: "mailbox-test-raw".into(),
            sqs_queue: None,
            webhook_url: None,
            rustmailbox_log_level: "info".into(),
            rustmailbox_ansi_logs: false,
            rustmailbox_json_logs: false,
            rustmailbox_log_to_file: false,
            rustmailbox_max_server_log_files: 5,
            rustmailbox_http_port: 15630,
            rustmailbox_bind_ip: "0.0.0.0".into(),
            rustmailbox_cors_origins: ["*".to_string()].into_iter().collect(),
            rustmailbox_cors_max_age: 86400,
            rustmailbox_http_compression_enabled: false,
            rustmailbox_request_timeout_seconds: 10,
            rustmailbox_root_dir: std::env::temp_dir()
                .join("rustmailbox_test_data")
                .to_string_lossy()
                .into_owned(),
            rustmailbox_metadata_memory_mode_enabled: true,
            rustmailbox_metadata_cache_size: 134217728,
            rustmailbox_nats_url: "nats://localhost:4222".into(),
            rustmailbox_nats_username: None,
            rustmailbox_nats_password: None,
            rustmailbox_generate_text: GenerateText::Auto,
            rustmailbox_smtp_host: "localhost".into(),
            rustmailbox_smtp_port: 587,
            rustmailbox_smtp_username: None,
            rustmailbox_smtp_password: None,
            rustmailbox_smtp_tls: true,
            rustmailbox_message_id_domain: None,
        }
    }
}
