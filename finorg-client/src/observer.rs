//! Request lifecycle hooks, handed to the client at construction time.

use reqwest::{Method, StatusCode};

/// Sees every request the client makes. All methods default to no-ops.
pub trait RequestObserver: Send + Sync {
    fn on_request(&self, _method: &Method, _url: &str) {}

    fn on_response(&self, _method: &Method, _url: &str, _status: StatusCode) {}

    fn on_error(&self, _method: &Method, _url: &str, _error: &anyhow::Error) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RequestObserver for NoopObserver {}

/// Observer that reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, method: &Method, url: &str) {
        tracing::debug!(%method, url, "api request");
    }

    fn on_response(&self, method: &Method, url: &str, status: StatusCode) {
        tracing::debug!(%method, url, status = status.as_u16(), "api response");
    }

    fn on_error(&self, method: &Method, url: &str, error: &anyhow::Error) {
        tracing::warn!(%method, url, "api request failed: {error:#}");
    }
}
