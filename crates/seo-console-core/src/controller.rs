//! Asynchronous operations over a store and its collaborator.
//!
//! A [`ResourceController`] is what a view talks to. Each operation:
//!
//! 1. validates its typed request (failures return immediately and never
//!    touch the slice),
//! 2. marks the operation pending via [`SliceStore::begin`],
//! 3. makes exactly one collaborator call,
//! 4. dispatches `Fulfilled` or `Rejected`, and
//! 5. returns the call's own result to the caller.
//!
//! Callers that need to chain on success (close a dialog, navigate) should
//! use the returned `Result`, not poll the slice's error field: the slice
//! resets errors on every new attempt independently of any one caller.
//!
//! There is no retry, timeout, or cancellation here. A failed call is
//! surfaced once.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::operation::{Operation, Ticket};
use crate::resource::{FilterPatch, ListQuery, Page, Resource, Validate, ValidationError};
use crate::service::{CallResult, Collaborator, CollaboratorError, ResourceService};
use crate::slice::{Action, CreatePolicy, Outcome, ResourceSlice};
use crate::store::SliceStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

pub type OperationResult<R> = Result<R, OperationError>;

pub struct ResourceController<T: Resource> {
    store: Arc<SliceStore<T>>,
    service: Arc<dyn ResourceService<T>>,
}

impl<T: Resource> Clone for ResourceController<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            service: Arc::clone(&self.service),
        }
    }
}

impl<T: Resource> ResourceController<T> {
    pub fn new(store: Arc<SliceStore<T>>, service: Arc<dyn ResourceService<T>>) -> Self {
        Self { store, service }
    }

    /// Convenience constructor with a fresh store.
    pub fn with_service(
        service: Arc<dyn ResourceService<T>>,
        create_policy: CreatePolicy,
        limit: u32,
    ) -> Self {
        Self::new(Arc::new(SliceStore::new(create_policy, limit)), service)
    }

    pub fn store(&self) -> &Arc<SliceStore<T>> {
        &self.store
    }

    pub fn snapshot(&self) -> Arc<ResourceSlice<T>> {
        self.store.snapshot()
    }

    /// The query the next list fetch will send.
    pub fn current_query(&self) -> ListQuery {
        self.store.select(|s| ListQuery {
            page: s.pagination().page,
            limit: s.pagination().limit,
            filters: s.filters().clone(),
        })
    }

    fn settle<R>(
        &self,
        ticket: Ticket,
        result: CallResult<R>,
        outcome: impl FnOnce(&R) -> Outcome<T>,
    ) -> CallResult<R> {
        match result {
            Ok(value) => {
                debug!(
                    resource = T::PLURAL,
                    operation = %ticket.operation,
                    attempt = ticket.attempt,
                    "operation succeeded"
                );
                self.store.dispatch(Action::Fulfilled {
                    ticket,
                    outcome: outcome(&value),
                });
                Ok(value)
            }
            Err(err) => {
                warn!(
                    resource = T::PLURAL,
                    operation = %ticket.operation,
                    attempt = ticket.attempt,
                    error = %err,
                    "operation failed"
                );
                self.store.dispatch(Action::Rejected {
                    ticket,
                    message: err.message.clone(),
                });
                Err(err)
            }
        }
    }

    fn begin(&self, op: Operation) -> Ticket {
        let ticket = self.store.begin(op);
        debug!(
            resource = T::PLURAL,
            operation = %op,
            attempt = ticket.attempt,
            "operation started"
        );
        ticket
    }

    /// Fetch the page described by the stored filters and pagination.
    pub async fn fetch_list(&self) -> OperationResult<Page<T>> {
        let query = self.current_query();
        let ticket = self.begin(Operation::FetchList);
        let result = self.service.list(&query).await;
        self.settle(ticket, result, |page| Outcome::Listed(page.clone()))
            .map_err(OperationError::from)
    }

    /// Create one record.
    ///
    /// Under [`CreatePolicy::Refetch`] the list is fetched again after a
    /// successful create; a failure of that follow-up fetch is recorded on
    /// `fetchList` and does not fail the create.
    pub async fn create(&self, draft: T::Draft) -> OperationResult<T> {
        draft.validate()?;
        let ticket = self.begin(Operation::Create);
        let result = self.service.create(&draft).await;
        let created = self.settle(ticket, result, |item| Outcome::Created(item.clone()))?;
        if self.store.select(|s| s.create_policy()) == CreatePolicy::Refetch {
            let _ = self.fetch_list().await;
        }
        Ok(created)
    }

    pub async fn update(&self, id: &str, patch: T::Patch) -> OperationResult<T> {
        patch.validate()?;
        let ticket = self.begin(Operation::Update);
        let result = self.service.update(id, &patch).await;
        self.settle(ticket, result, |item| Outcome::Updated(item.clone()))
            .map_err(OperationError::from)
    }

    pub async fn delete(&self, id: &str) -> OperationResult<()> {
        let ticket = self.begin(Operation::Delete);
        let result = self.service.delete(id).await;
        self.settle(ticket, result, |_| Outcome::Deleted(id.to_string()))
            .map_err(OperationError::from)
    }

    /// Create many records. The list is not refreshed; follow up with
    /// [`fetch_list`](Self::fetch_list).
    pub async fn bulk_create(&self, drafts: Vec<T::Draft>) -> OperationResult<()> {
        for draft in &drafts {
            draft.validate()?;
        }
        let ticket = self.begin(Operation::BulkCreate);
        let result = self.service.bulk_create(&drafts).await;
        self.settle(ticket, result, |_| Outcome::Acknowledged)
            .map_err(OperationError::from)
    }

    /// Update many records. The list is not refreshed; follow up with
    /// [`fetch_list`](Self::fetch_list).
    pub async fn bulk_update(&self, patches: Vec<(String, T::Patch)>) -> OperationResult<()> {
        for (_, patch) in &patches {
            patch.validate()?;
        }
        let ticket = self.begin(Operation::BulkUpdate);
        let result = self.service.bulk_update(&patches).await;
        self.settle(ticket, result, |_| Outcome::Acknowledged)
            .map_err(OperationError::from)
    }

    pub async fn bulk_delete(&self, ids: Vec<String>) -> OperationResult<()> {
        let ticket = self.begin(Operation::BulkDelete);
        let result = self.service.bulk_delete(&ids).await;
        self.settle(ticket, result, |_| Outcome::BulkDeleted(ids.clone()))
            .map_err(OperationError::from)
    }

    /// Delete every currently selected record.
    pub async fn delete_selected(&self) -> OperationResult<()> {
        let ids: Vec<String> = self.store.select(|s| s.selected().iter().cloned().collect());
        self.bulk_delete(ids).await
    }

    /// Run a feature-specific operation whose collaborator returns the
    /// updated record, e.g. rerunning an audit.
    pub async fn perform<P, C>(
        &self,
        op: Operation,
        collaborator: &C,
        params: P,
    ) -> OperationResult<T>
    where
        P: Send + 'static,
        C: Collaborator<P, T> + ?Sized,
    {
        let ticket = self.begin(op);
        let result = collaborator.call(params).await;
        self.settle(ticket, result, |item| Outcome::Updated(item.clone()))
            .map_err(OperationError::from)
    }

    /// Store new filter criteria, go back to page 1, and refetch.
    pub async fn apply_filters(&self, patch: FilterPatch) -> OperationResult<Page<T>> {
        self.store.dispatch(Action::SetFilters(patch));
        self.store.dispatch(Action::SetPage(1));
        self.fetch_list().await
    }

    pub async fn go_to_page(&self, page: u32) -> OperationResult<Page<T>> {
        self.store.dispatch(Action::SetPage(page));
        self.fetch_list().await
    }

    /// Change the page size, go back to page 1, and refetch.
    pub async fn set_limit(&self, limit: u32) -> OperationResult<Page<T>> {
        self.store.dispatch(Action::SetLimit(limit));
        self.store.dispatch(Action::SetPage(1));
        self.fetch_list().await
    }

    pub fn select(&self, id: impl Into<String>) {
        self.store.dispatch(Action::Select(id.into()));
    }

    pub fn deselect(&self, id: impl Into<String>) {
        self.store.dispatch(Action::Deselect(id.into()));
    }

    pub fn select_all(&self) {
        self.store.dispatch(Action::SelectAll);
    }

    pub fn deselect_all(&self) {
        self.store.dispatch(Action::DeselectAll);
    }

    pub fn clear_error(&self, op: Operation) {
        self.store.dispatch(Action::ClearError(op));
    }

    pub fn clear(&self) {
        self.store.dispatch(Action::Clear);
    }
}
