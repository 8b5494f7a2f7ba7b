// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::common::error::ErrorCapture;
use crate::modules::common::log::Tracing;
use crate::modules::common::timeout::{Timeout, TIMEOUT_HEADER};
use crate::modules::context::MailboxContext;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::handler::error_handler;
use crate::modules::error::MailboxResult;
use crate::modules::settings::cli::Settings;
use crate::modules::utils::shutdown::shutdown_signal;

use super::error::ApiErrorResponse;
use crate::raise_error;
use api::create_openapi_service;
use poem::listener::TcpListener;
use poem::middleware::{CatchPanic, Compression, Cors};
use poem::{Endpoint, EndpointExt, Route, Server};
use std::time::Duration;
use tracing::info;

pub mod api;
pub mod response;
#[cfg(test)]
mod tests;

pub type ApiResult<T, E = ApiErrorResponse> = std::result::Result<T, E>;

const DESCRIPTION: &str = r#"
    RustMailbox stores received mail, groups replies into conversation threads and lets clients
    list, read, compose, send, trash, restore and delete emails and threads over HTTP.
"#;

/// The full route with documentation, middleware and the shared context attached.
pub fn build_route(ctx: MailboxContext, settings: &Settings) -> impl Endpoint {
    let api_service = create_openapi_service()
        .description(DESCRIPTION)
        .summary("A mailbox service backed by a key/value table and a blob store");

    let swagger = api_service.swagger_ui();
    let spec_json = api_service.spec_endpoint();

    let api_route = api_service
        .with(ErrorCapture)
        .with(Timeout::new(settings.rustmailbox_request_timeout_seconds))
        .with(Tracing);

    let mut cors_origins = settings.rustmailbox_cors_origins.clone();
    if cors_origins.is_empty() {
        cors_origins = ["*".to_string()].into_iter().collect();
    }

    let cors = Cors::new()
        .allow_origins(cors_origins)
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS", "HEAD"])
        .allow_headers(vec!["Content-Type", TIMEOUT_HEADER])
        .expose_headers(vec!["Content-Disposition"])
        .max_age(settings.rustmailbox_cors_max_age);

    Route::new()
        .nest("/api-docs/swagger", swagger)
        .nest("/api-docs/spec.json", spec_json)
        .nest_no_strip("/", api_route)
        .with(cors)
        .with_if(
            settings.rustmailbox_http_compression_enabled,
            Compression::new(),
        )
        .with(CatchPanic::new())
        .data(ctx)
        .catch_all_error(error_handler)
}

pub async fn start_http_server(ctx: MailboxContext, settings: &Settings) -> MailboxResult<()> {
    let listener = TcpListener::bind((
        settings.rustmailbox_bind_ip.clone(),
        settings.rustmailbox_http_port,
    ));

    let server = Server::new(listener)
        .name("RustMailbox API Service")
        .idle_timeout(Duration::from_secs(60))
        .run_with_graceful_shutdown(
            build_route(ctx, settings),
            shutdown_signal(),
            Some(Duration::from_secs(5)),
        );
    info!(
        "RustMailbox API Service is now running on port {}.",
        settings.rustmailbox_http_port
    );
    server
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
}
