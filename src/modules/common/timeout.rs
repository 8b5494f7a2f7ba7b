// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem::{Endpoint, Middleware, Request, Result};
use std::time::Duration;
use tracing::error;

use crate::modules::error::code::ErrorCode;

use super::create_api_error_response;

pub const TIMEOUT_HEADER: &str = "X-Mailbox-Timeout-Seconds";
pub const MAX_TIMEOUT_SECONDS: u64 = 600;

/// Per-request deadline. The header overrides `default_seconds`, capped at
/// [`MAX_TIMEOUT_SECONDS`].
pub struct Timeout {
    default_seconds: u64,
}

impl Timeout {
    pub fn new(default_seconds: u64) -> Self {
        Self { default_seconds }
    }
}

impl<E: Endpoint> Middleware<E> for Timeout {
    type Output = TimeoutEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        TimeoutEndpoint {
            ep,
            default_seconds: self.default_seconds,
        }
    }
}

pub struct TimeoutEndpoint<E> {
    ep: E,
    default_seconds: u64,
}

#[inline]
fn extract_timeout(req: &Request) -> Option<u64> {
    req.header(TIMEOUT_HEADER)
        .and_then(|v| v.trim().parse::<u64>().ok())
}

impl<E: Endpoint> Endpoint for TimeoutEndpoint<E> {
    type Output = E::Output;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let seconds = extract_timeout(&req)
            .unwrap_or(self.default_seconds)
            .clamp(1, MAX_TIMEOUT_SECONDS);
        match tokio::time::timeout(Duration::from_secs(seconds), self.ep.call(req)).await {
            Ok(result) => result,
            Err(_) => {
                error!("Request timed out after {} seconds", seconds);
                Err(create_api_error_response(
                    &format!(
                        "Request timed out after {} seconds (set via {} header, max allowed: {} seconds)",
                        seconds, TIMEOUT_HEADER, MAX_TIMEOUT_SECONDS
                    ),
                    ErrorCode::RequestTimeout,
                ))
            }
        }
    }
}
