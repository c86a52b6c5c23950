//! finorg-client: REST client for the finance backend, with pluggable request observers

pub mod client;
pub mod observer;

pub use client::{ApiClient, DEFAULT_BASE_URL, TokenResponse};
pub use observer::{NoopObserver, RequestObserver, TracingObserver};

pub use reqwest;
