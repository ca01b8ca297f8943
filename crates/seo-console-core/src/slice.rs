//! The resource slice: one collection's state plus its transition rules.
//!
//! A [`ResourceSlice`] owns the loaded items, pagination, filter criteria,
//! per-operation loading/error state, and the bulk-selection set. It is
//! only changed through [`ResourceSlice::begin`] and
//! [`ResourceSlice::reduce`]; both are synchronous and never fail.
//!
//! # Transitions
//!
//! ```text
//! idle ──begin──▶ pending ──Fulfilled──▶ succeeded
//!                    │                       │
//!                    └──Rejected──▶ failed   │
//!                                    │       │
//!         pending ◀──────begin───────┴───────┘
//! ```
//!
//! Completions carry the [`Ticket`] returned by `begin`. Only the latest
//! attempt of an operation moves its status. A list outcome from a
//! superseded fetch is discarded, so the most recently started fetch
//! always wins regardless of response order.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};

use crate::operation::{Operation, OperationState, OperationStatus, Ticket};
use crate::resource::{FilterPatch, Filters, Page, Pagination, Resource};

/// How a feature reconciles a successful single create.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatePolicy {
    /// Append the created record and increment `total`.
    #[default]
    Append,
    /// Leave `items` alone; the controller refetches the list.
    Refetch,
}

/// Result payload of a successful operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Listed(Page<T>),
    Created(T),
    Updated(T),
    Deleted(String),
    BulkDeleted(Vec<String>),
    /// Success with no assumed payload shape (bulk create/update).
    Acknowledged,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action<T> {
    Fulfilled { ticket: Ticket, outcome: Outcome<T> },
    Rejected { ticket: Ticket, message: Option<String> },
    SetFilters(FilterPatch),
    SetPage(u32),
    SetLimit(u32),
    Select(String),
    Deselect(String),
    SelectAll,
    DeselectAll,
    ClearError(Operation),
    Clear,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceSlice<T> {
    items: Vec<T>,
    pagination: Pagination,
    filters: Filters,
    #[serde(serialize_with = "serialize_ops")]
    operations: BTreeMap<Operation, OperationState>,
    selected: BTreeSet<String>,
    create_policy: CreatePolicy,
    #[serde(skip)]
    max_limit: u32,
    version: u64,
}

fn serialize_ops<S: Serializer>(
    ops: &BTreeMap<Operation, OperationState>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(ops.iter().map(|(op, state)| (op.name(), state)))
}

impl<T: Resource> Default for ResourceSlice<T> {
    fn default() -> Self {
        Self::new(CreatePolicy::default(), Pagination::default().limit)
    }
}

impl<T: Resource> ResourceSlice<T> {
    pub fn new(create_policy: CreatePolicy, limit: u32) -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::new(limit),
            filters: Filters::default(),
            operations: BTreeMap::new(),
            selected: BTreeSet::new(),
            create_policy,
            max_limit: u32::MAX,
            version: 0,
        }
    }

    /// Caps the page size, including later `SetLimit` actions.
    pub fn with_max_limit(mut self, max_limit: u32) -> Self {
        self.max_limit = max_limit.max(1);
        self.pagination.limit = self.pagination.limit.clamp(1, self.max_limit);
        self
    }

    pub fn max_limit(&self) -> u32 {
        self.max_limit
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn total(&self) -> u64 {
        self.pagination.total
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn create_policy(&self) -> CreatePolicy {
        self.create_policy
    }

    /// Bumped on every state change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn operation(&self, op: Operation) -> Option<&OperationState> {
        self.operations.get(&op)
    }

    pub fn status(&self, op: Operation) -> OperationStatus {
        self.operations
            .get(&op)
            .map(|s| s.status)
            .unwrap_or_default()
    }

    pub fn loading(&self, op: Operation) -> bool {
        self.operations
            .get(&op)
            .map(OperationState::is_loading)
            .unwrap_or(false)
    }

    pub fn error(&self, op: Operation) -> Option<&str> {
        self.operations.get(&op).and_then(|s| s.error.as_deref())
    }

    pub fn loading_map(&self) -> BTreeMap<Operation, bool> {
        self.operations
            .iter()
            .map(|(op, s)| (*op, s.is_loading()))
            .collect()
    }

    pub fn error_map(&self) -> BTreeMap<Operation, Option<String>> {
        self.operations
            .iter()
            .map(|(op, s)| (*op, s.error.clone()))
            .collect()
    }

    /// Every operation that has been started at least once.
    pub fn operations(&self) -> impl Iterator<Item = (Operation, &OperationState)> {
        self.operations.iter().map(|(op, state)| (*op, state))
    }

    /// Whether any operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.operations.values().any(OperationState::is_loading)
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Start a new attempt of `op`: loading on, previous error cleared.
    pub fn begin(&mut self, op: Operation) -> Ticket {
        let state = self.operations.entry(op).or_default();
        state.attempt += 1;
        state.status = OperationStatus::Pending;
        state.error = None;
        let ticket = Ticket {
            operation: op,
            attempt: state.attempt,
        };
        self.version += 1;
        ticket
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        self.operations
            .get(&ticket.operation)
            .map(|s| s.attempt == ticket.attempt)
            .unwrap_or(false)
    }

    pub fn reduce(&mut self, action: Action<T>) {
        match action {
            Action::Fulfilled { ticket, outcome } => self.fulfill(ticket, outcome),
            Action::Rejected { ticket, message } => self.reject(ticket, message),
            Action::SetFilters(patch) => self.filters.merge(patch),
            Action::SetPage(page) => self.pagination.page = page.max(1),
            Action::SetLimit(limit) => self.pagination.limit = limit.clamp(1, self.max_limit),
            Action::Select(id) => {
                self.selected.insert(id);
            }
            Action::Deselect(id) => {
                self.selected.remove(&id);
            }
            Action::SelectAll => {
                self.selected = self.items.iter().map(|i| i.id().to_string()).collect();
            }
            Action::DeselectAll => self.selected.clear(),
            Action::ClearError(op) => {
                if let Some(state) = self.operations.get_mut(&op) {
                    state.error = None;
                }
            }
            Action::Clear => self.clear(),
        }
        self.version += 1;
    }

    fn fulfill(&mut self, ticket: Ticket, outcome: Outcome<T>) {
        let current = self.is_current(&ticket);
        match outcome {
            Outcome::Listed(page) => {
                if !current {
                    return;
                }
                self.pagination = page.pagination();
                self.items = page.items;
            }
            Outcome::Created(item) => {
                if self.create_policy == CreatePolicy::Append {
                    self.items.push(item);
                    self.pagination.total += 1;
                }
            }
            Outcome::Updated(item) => {
                if let Some(slot) = self.items.iter_mut().find(|i| i.id() == item.id()) {
                    *slot = item;
                }
            }
            Outcome::Deleted(id) => {
                let before = self.items.len();
                self.items.retain(|i| i.id() != id);
                if self.items.len() < before {
                    self.pagination.total = self.pagination.total.saturating_sub(1);
                }
                self.selected.remove(&id);
            }
            Outcome::BulkDeleted(ids) => {
                let doomed: BTreeSet<&str> = ids.iter().map(String::as_str).collect();
                let before = self.items.len();
                self.items.retain(|i| !doomed.contains(i.id()));
                let removed = (before - self.items.len()) as u64;
                self.pagination.total = self.pagination.total.saturating_sub(removed);
                self.selected.clear();
            }
            Outcome::Acknowledged => {}
        }
        if current {
            if let Some(state) = self.operations.get_mut(&ticket.operation) {
                state.status = OperationStatus::Succeeded;
                state.error = None;
            }
        }
    }

    fn reject(&mut self, ticket: Ticket, message: Option<String>) {
        if !self.is_current(&ticket) {
            return;
        }
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| ticket.operation.fallback_message(T::SINGULAR, T::PLURAL));
        if let Some(state) = self.operations.get_mut(&ticket.operation) {
            state.status = OperationStatus::Failed;
            state.error = Some(message);
        }
    }

    fn clear(&mut self) {
        self.items.clear();
        self.selected.clear();
        self.pagination = Pagination::new(self.pagination.limit);
        for state in self.operations.values_mut() {
            if state.is_loading() {
                // orphan the in-flight attempt
                state.attempt += 1;
            }
            state.status = OperationStatus::Idle;
            state.error = None;
        }
    }
}
