// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::{
    num::NonZeroU32,
    sync::{Arc, LazyLock},
    time::Instant,
};

use governor::{
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::InMemoryState,
    Quota, RateLimiter,
};
use poem::{
    http::header, web::RealIp, Endpoint, FromRequest, IntoResponse, Middleware, Request, Response,
    Result,
};
use poem_openapi::OperationId;
use tracing::{error, info, warn, Instrument};

pub type GovRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    InMemoryState,
    QuantaClock,
    NoOpMiddleware<QuantaInstant>,
>;

static RATE_LIMITER: LazyLock<LogRateLimiter> = LazyLock::new(LogRateLimiter::new);

/// Bounds how many completed requests are logged per second. Errors cost less
/// than successes so they are the last to be dropped.
pub struct LogRateLimiter {
    limiter: Arc<GovRateLimiter>,
}

impl LogRateLimiter {
    pub fn new() -> Self {
        let quota = Quota::per_second(NonZeroU32::MIN.saturating_add(9));
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub fn should_log(&self, status: u16) -> bool {
        let cost = match status {
            500_u16.. => NonZeroU32::MIN,
            400_u16..=499_u16 => NonZeroU32::MIN.saturating_add(2),
            _ => NonZeroU32::MIN.saturating_add(4),
        };
        self.limiter.check_n(cost).map(|r| r.is_ok()).unwrap_or(false)
    }
}

#[derive(Default)]
pub struct Tracing;

impl<E: Endpoint> Middleware<E> for Tracing {
    type Output = TracingEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        TracingEndpoint { inner: ep }
    }
}

/// Endpoint for the `Tracing` middleware.
pub struct TracingEndpoint<E> {
    inner: E,
}

impl<E: Endpoint> Endpoint for TracingEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let remote_addr = RealIp::from_request_without_body(&req)
            .await
            .ok()
            .and_then(|real_ip| real_ip.0)
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| req.remote_addr().to_string());
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let query = req.uri().query().map(|q| q.to_string());
        let content_length = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok().map(|v| v.to_string()));

        let span = tracing::info_span!(
            "request",
            remote_addr = %remote_addr,
            method = %method,
            path = %path,
            query = ?query,
            content_length = ?content_length,
        );

        async move {
            let now = Instant::now();
            let res = self.inner.call(req).await;
            let duration = now.elapsed();

            match res {
                Ok(resp) => {
                    let resp = resp.into_response();
                    let operation = resp.data::<OperationId>().map(|id| id.0);
                    log_response(resp.status().as_u16(), operation, duration);
                    Ok(resp)
                }
                Err(err) => {
                    log_response(err.status().as_u16(), None, duration);
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[inline]
fn log_response(status: u16, operation: Option<&str>, duration: std::time::Duration) {
    if !RATE_LIMITER.should_log(status) {
        return;
    }
    match status {
        500.. => {
            error!(
                status = %status,
                operation = ?operation,
                duration = ?duration,
                "request completed with server error"
            );
        }
        400..=499 => {
            warn!(
                status = %status,
                operation = ?operation,
                duration = ?duration,
                "request completed with client error"
            );
        }
        _ => {
            info!(
                status = %status,
                operation = ?operation,
                duration = ?duration,
                "request completed successfully"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LogRateLimiter;

    #[test]
    fn test_errors_outlast_successes() {
        let limiter = LogRateLimiter::new();
        assert!(limiter.should_log(200));
        assert!(limiter.should_log(200));
        // 10 cells per second, two successes spent them all
        assert!(!limiter.should_log(200));
    }
}
