//! REST collaborator for the console's backend API.
//!
//! Every feature area is a collection under the configured base URL:
//!
//! | Call | Route |
//! |------|-------|
//! | list | `GET /{path}?page&limit&search&status&category&sort_by&sort_order` |
//! | create | `POST /{path}` |
//! | update | `PATCH /{path}/{id}` |
//! | delete | `DELETE /{path}/{id}` |
//! | bulk create | `POST /{path}/bulk` |
//! | bulk update | `PATCH /{path}/bulk` |
//! | bulk delete | `POST /{path}/bulk-delete` |
//! | action | `POST /{path}/{id}/{action}` |
//!
//! Requests carry a bearer token (when the configured environment variable
//! is set) and an `X-Request-Id`. There is no retry: a failed call is
//! reported once, with the backend's message when its body has one.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use seo_console_core::resource::{ListQuery, Page, Resource};
use seo_console_core::service::{CallResult, Collaborator, CollaboratorError, ResourceService};

use crate::config::ApiConfig;
use crate::models::{AiRequest, Audit, ContentItem, Keyword, Ranking, TrafficReport};

/// A resource reachable as a REST collection.
pub trait RestResource: Resource + DeserializeOwned + Serialize {
    /// Collection path below the API base URL.
    const PATH: &'static str;
}

impl RestResource for Keyword {
    const PATH: &'static str = "keywords";
}
impl RestResource for ContentItem {
    const PATH: &'static str = "content";
}
impl RestResource for Audit {
    const PATH: &'static str = "audits";
}
impl RestResource for AiRequest {
    const PATH: &'static str = "ai-requests";
}
impl RestResource for Ranking {
    const PATH: &'static str = "rankings";
}
impl RestResource for TrafficReport {
    const PATH: &'static str = "traffic-reports";
}

/// Shared HTTP client, base URL, and credentials.
pub struct RestClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl RestClient {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let base = Url::parse(&api.base_url)
            .with_context(|| format!("Invalid API base URL: {}", api.base_url))?;
        if base.cannot_be_a_base() {
            bail!("API base URL cannot have paths appended: {}", api.base_url);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        let token = std::env::var(&api.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        Ok(Self { http, base, token })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `base` with `segments` appended as escaped path segments.
    pub fn endpoint(&self, segments: &[&str]) -> CallResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CollaboratorError::new("API base URL cannot have paths appended"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let rb = self
            .http
            .request(method, url)
            .header("X-Request-Id", uuid::Uuid::new_v4().to_string());
        match self.token {
            Some(ref token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    async fn send(&self, rb: RequestBuilder) -> CallResult<reqwest::Response> {
        let response = rb.send().await.map_err(transport_error)?;
        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "api response");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let error = match extract_error_message(&body) {
            Some(message) => CollaboratorError::new(message),
            None => CollaboratorError::without_message(),
        };
        Err(error.with_status(status.as_u16()))
    }

    async fn send_json<R: DeserializeOwned>(&self, rb: RequestBuilder) -> CallResult<R> {
        let response = self.send(rb).await?;
        response
            .json::<R>()
            .await
            .map_err(|e| CollaboratorError::new(format!("Unexpected response body: {}", e)))
    }

    async fn send_empty(&self, rb: RequestBuilder) -> CallResult<()> {
        self.send(rb).await.map(|_| ())
    }
}

fn transport_error(err: reqwest::Error) -> CollaboratorError {
    if err.is_timeout() {
        CollaboratorError::new("Request timed out")
    } else if err.is_connect() {
        CollaboratorError::new("Could not connect to the API")
    } else {
        // no message: the slice falls back to its per-operation text
        CollaboratorError::without_message()
    }
}

/// Pull a human-readable message out of an error response body.
///
/// Looks at `message`, then `error.message`, then a string `error`.
pub fn extract_error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let candidate = json
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
        })
        .or_else(|| json.get("error").and_then(|e| e.as_str()))?;
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// [`ResourceService`] over the REST collection at `T::PATH`.
pub struct RestService<T> {
    client: Arc<RestClient>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: RestResource> RestService<T> {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self {
            client,
            _marker: PhantomData,
        }
    }

    fn url(&self, rest: &[&str]) -> CallResult<Url> {
        let mut segments = Vec::with_capacity(rest.len() + 1);
        segments.push(T::PATH);
        segments.extend_from_slice(rest);
        self.client.endpoint(&segments)
    }
}

#[derive(Serialize)]
struct BulkPatch<'a, P> {
    id: &'a str,
    #[serde(flatten)]
    patch: &'a P,
}

#[derive(Serialize)]
struct BulkIds<'a> {
    ids: &'a [String],
}

#[async_trait]
impl<T: RestResource> ResourceService<T> for RestService<T> {
    async fn list(&self, query: &ListQuery) -> CallResult<Page<T>> {
        let url = self.url(&[])?;
        let rb = self
            .client
            .request(Method::GET, url)
            .query(&query.query_pairs());
        self.client.send_json(rb).await
    }

    async fn create(&self, draft: &T::Draft) -> CallResult<T> {
        let rb = self.client.request(Method::POST, self.url(&[])?).json(draft);
        self.client.send_json(rb).await
    }

    async fn update(&self, id: &str, patch: &T::Patch) -> CallResult<T> {
        let rb = self
            .client
            .request(Method::PATCH, self.url(&[id])?)
            .json(patch);
        self.client.send_json(rb).await
    }

    async fn delete(&self, id: &str) -> CallResult<()> {
        let rb = self.client.request(Method::DELETE, self.url(&[id])?);
        self.client.send_empty(rb).await
    }

    async fn bulk_create(&self, drafts: &[T::Draft]) -> CallResult<()> {
        let rb = self
            .client
            .request(Method::POST, self.url(&["bulk"])?)
            .json(drafts);
        self.client.send_empty(rb).await
    }

    async fn bulk_update(&self, patches: &[(String, T::Patch)]) -> CallResult<()> {
        let body: Vec<BulkPatch<'_, T::Patch>> = patches
            .iter()
            .map(|(id, patch)| BulkPatch { id, patch })
            .collect();
        let rb = self
            .client
            .request(Method::PATCH, self.url(&["bulk"])?)
            .json(&body);
        self.client.send_empty(rb).await
    }

    async fn bulk_delete(&self, ids: &[String]) -> CallResult<()> {
        let rb = self
            .client
            .request(Method::POST, self.url(&["bulk-delete"])?)
            .json(&BulkIds { ids });
        self.client.send_empty(rb).await
    }
}

/// `POST /{path}/{id}/{action}`, answering with the updated record.
pub struct ActionCollaborator<T> {
    client: Arc<RestClient>,
    action: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: RestResource> ActionCollaborator<T> {
    pub fn new(client: Arc<RestClient>, action: &'static str) -> Self {
        Self {
            client,
            action,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T: RestResource> Collaborator<String, T> for ActionCollaborator<T> {
    async fn call(&self, id: String) -> CallResult<T> {
        let url = self.client.endpoint(&[T::PATH, id.as_str(), self.action])?;
        let rb = self.client.request(Method::POST, url);
        self.client.send_json(rb).await
    }
}
