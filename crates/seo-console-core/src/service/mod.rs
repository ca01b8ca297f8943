//! Collaborator abstractions.
//!
//! Every asynchronous operation is a thin wrapper around exactly one call
//! to an external collaborator. The core makes no assumptions about the
//! transport; the app crate provides a REST implementation and
//! [`memory::InMemoryService`] serves tests and offline use.
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`Collaborator`] | One typed call: `params -> result` |
//! | [`ResourceService`] | The standard list/create/update/delete calls for one resource |

pub mod memory;

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use thiserror::Error;

use crate::resource::{ListQuery, Page, Resource};

/// Failure reported by a collaborator.
///
/// `message` is a human-readable explanation when the collaborator
/// supplied one. When it is `None` the slice records a generic
/// per-operation fallback instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.message, .status))]
pub struct CollaboratorError {
    pub message: Option<String>,
    /// Transport status code, when there was one.
    pub status: Option<u16>,
}

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            status: None,
        }
    }

    pub fn without_message() -> Self {
        Self {
            message: None,
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

fn describe(message: &Option<String>, status: &Option<u16>) -> String {
    match (message, status) {
        (Some(m), Some(s)) => format!("{} (status {})", m, s),
        (Some(m), None) => m.clone(),
        (None, Some(s)) => format!("request failed with status {}", s),
        (None, None) => "request failed".to_string(),
    }
}

pub type CallResult<R> = Result<R, CollaboratorError>;

/// A single asynchronous call to an external service.
#[async_trait]
pub trait Collaborator<P, R>: Send + Sync
where
    P: Send + 'static,
    R: Send + 'static,
{
    async fn call(&self, params: P) -> CallResult<R>;
}

/// Adapts an async closure into a [`Collaborator`].
///
/// ```rust
/// use seo_console_core::service::{CollaboratorError, Collaborator, FnCollaborator};
///
/// # async fn demo() {
/// let double: FnCollaborator<_, u32, u32> =
///     FnCollaborator::new(|n: u32| async move { Ok::<_, CollaboratorError>(n * 2) });
/// assert_eq!(double.call(21).await, Ok(42));
/// # }
/// ```
pub struct FnCollaborator<F, P, R> {
    f: F,
    _marker: PhantomData<fn(P) -> R>,
}

impl<F, P, R> FnCollaborator<F, P, R> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut, P, R> Collaborator<P, R> for FnCollaborator<F, P, R>
where
    F: Fn(P) -> Fut + Send + Sync,
    Fut: Future<Output = CallResult<R>> + Send + 'static,
    P: Send + 'static,
    R: Send + 'static,
{
    async fn call(&self, params: P) -> CallResult<R> {
        (self.f)(params).await
    }
}

/// The standard remote calls backing one resource slice.
///
/// Bulk calls return nothing: their response shape is not assumed, and
/// callers resynchronize with a list fetch afterwards.
#[async_trait]
pub trait ResourceService<T: Resource>: Send + Sync {
    async fn list(&self, query: &ListQuery) -> CallResult<Page<T>>;

    async fn create(&self, draft: &T::Draft) -> CallResult<T>;

    async fn update(&self, id: &str, patch: &T::Patch) -> CallResult<T>;

    async fn delete(&self, id: &str) -> CallResult<()>;

    async fn bulk_create(&self, drafts: &[T::Draft]) -> CallResult<()>;

    async fn bulk_update(&self, patches: &[(String, T::Patch)]) -> CallResult<()>;

    async fn bulk_delete(&self, ids: &[String]) -> CallResult<()>;
}
