//! Typed REST client for the finance backend.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use finorg_core::{Card, Ledger, RecurringTransaction, Resource, Transaction, Validate};
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::observer::{NoopObserver, RequestObserver};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    observer: Arc<dyn RequestObserver>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Swap the underlying HTTP client (timeouts, proxies, TLS settings).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Exchange credentials for a bearer token and keep it for later calls.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<TokenResponse> {
        let form = [("username", email), ("password", password)];
        let token: TokenResponse = self
            .send_json(Method::POST, "auth/login", |req| req.form(&form))
            .await
            .context("login")?;
        self.token = Some(token.access_token.clone());
        Ok(token)
    }

    pub async fn list<R: Resource>(&self) -> Result<Vec<R>> {
        self.send_json(Method::GET, &format!("{}/", R::COLLECTION), |req| req)
            .await
            .with_context(|| format!("list {}s", R::LABEL))
    }

    pub async fn get<R: Resource>(&self, id: i64) -> Result<R> {
        self.send_json(Method::GET, &format!("{}/{id}", R::COLLECTION), |req| req)
            .await
            .with_context(|| format!("get {} {id}", R::LABEL))
    }

    /// Validates the draft first; an invalid draft never reaches the network.
    pub async fn create<R: Resource>(&self, draft: &R::Draft) -> Result<R> {
        draft
            .validate()
            .with_context(|| format!("invalid {}", R::LABEL))?;
        self.send_json(Method::POST, &format!("{}/", R::COLLECTION), |req| req.json(draft))
            .await
            .with_context(|| format!("create {}", R::LABEL))
    }

    pub async fn update<R: Resource>(&self, id: i64, draft: &R::Draft) -> Result<R> {
        draft
            .validate()
            .with_context(|| format!("invalid {}", R::LABEL))?;
        self.send_json(Method::PUT, &format!("{}/{id}", R::COLLECTION), |req| req.json(draft))
            .await
            .with_context(|| format!("update {} {id}", R::LABEL))
    }

    pub async fn delete<R: Resource>(&self, id: i64) -> Result<()> {
        self.send(Method::DELETE, &format!("{}/{id}", R::COLLECTION), |req| req)
            .await
            .with_context(|| format!("delete {} {id}", R::LABEL))?;
        Ok(())
    }

    /// Ask the backend to materialize the due occurrence now.
    /// Returns the template with whatever `next_date` the backend moved it to.
    pub async fn process_recurring(&self, id: i64) -> Result<RecurringTransaction> {
        let path = format!("{}/{id}/process", RecurringTransaction::COLLECTION);
        self.send_json(Method::POST, &path, |req| req)
            .await
            .with_context(|| format!("process recurring transaction {id}"))
    }

    /// Fetch transactions, cards and recurring templates concurrently.
    pub async fn fetch_ledger(&self) -> Result<Ledger> {
        let (transactions, cards, recurring) = tokio::try_join!(
            self.list::<Transaction>(),
            self.list::<Card>(),
            self.list::<RecurringTransaction>(),
        )?;
        Ok(Ledger {
            transactions,
            cards,
            recurring,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T> {
        let resp = self.send(method, path, build).await?;
        let url = resp.url().to_string();
        let body = resp
            .bytes()
            .await
            .with_context(|| format!("read body from {url}"))?;
        serde_json::from_slice(&body).with_context(|| format!("decode response from {url}"))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response> {
        let url = self.url(path);
        self.observer.on_request(&method, &url);

        let mut req = self.http.request(method.clone(), &url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = match build(req).send().await {
            Ok(resp) => resp,
            Err(e) => {
                let err = anyhow::Error::new(e).context(format!("{method} {url}"));
                self.observer.on_error(&method, &url, &err);
                return Err(err);
            }
        };

        let status = resp.status();
        self.observer.on_response(&method, &url, status);
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let err = match error_detail(&body) {
            Some(detail) => anyhow!("{method} {url} failed with {status}: {detail}"),
            None => anyhow!("{method} {url} failed with {status}"),
        };
        self.observer.on_error(&method, &url, &err);
        Err(err)
    }
}

/// The backend reports errors as `{"detail": ...}`; detail may be a string or
/// a list of validation problems.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
