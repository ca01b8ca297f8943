//! Explicitly injected state container with change subscriptions.
//!
//! A [`SliceStore`] is the single writer for one [`ResourceSlice`]. Views
//! read through [`snapshot`](SliceStore::snapshot) or
//! [`select`](SliceStore::select) and change state only by dispatching
//! actions. Each reducer call runs under the write lock, so two reducers
//! never interleave mid-mutation.
//!
//! Subscribers are called after every change with the new snapshot. They
//! run outside the lock and may dispatch further actions.
//!
//! Stores are ordinary values: construct one per test or per session and
//! pass it where it is needed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::operation::{Operation, Ticket};
use crate::resource::Resource;
use crate::slice::{Action, CreatePolicy, ResourceSlice};

type Listener<T> = Arc<dyn Fn(&ResourceSlice<T>) + Send + Sync>;

/// Handle returned by [`SliceStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct SliceStore<T: Resource> {
    state: RwLock<Arc<ResourceSlice<T>>>,
    listeners: Mutex<Vec<(SubscriptionId, Listener<T>)>>,
    next_id: AtomicU64,
}

impl<T: Resource> SliceStore<T> {
    pub fn new(create_policy: CreatePolicy, limit: u32) -> Self {
        Self::from_slice(ResourceSlice::new(create_policy, limit))
    }

    pub fn from_slice(slice: ResourceSlice<T>) -> Self {
        Self {
            state: RwLock::new(Arc::new(slice)),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Current state. Cheap: shares the snapshot until the next change.
    pub fn snapshot(&self) -> Arc<ResourceSlice<T>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn select<R>(&self, f: impl FnOnce(&ResourceSlice<T>) -> R) -> R {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Mark `op` pending and return the ticket for its completion.
    pub fn begin(&self, op: Operation) -> Ticket {
        self.update(|slice| slice.begin(op))
    }

    pub fn dispatch(&self, action: Action<T>) {
        self.update(|slice| slice.reduce(action));
    }

    fn update<R>(&self, f: impl FnOnce(&mut ResourceSlice<T>) -> R) -> R {
        let (result, snapshot) = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let result = f(Arc::make_mut(&mut state));
            (result, Arc::clone(&state))
        };
        self.notify(&snapshot);
        result
    }

    fn notify(&self, snapshot: &ResourceSlice<T>) {
        let listeners: Vec<Listener<T>> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ResourceSlice<T>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() < before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<T: Resource> Default for SliceStore<T> {
    fn default() -> Self {
        Self::from_slice(ResourceSlice::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Validate;
    use crate::slice::Outcome;
    use serde::Serialize;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: String,
    }

    #[derive(Debug, Clone, Serialize)]
    struct RowDraft;
    impl Validate for RowDraft {}

    impl Resource for Row {
        type Draft = RowDraft;
        type Patch = RowDraft;
        const SINGULAR: &'static str = "row";
        const PLURAL: &'static str = "rows";

        fn id(&self) -> &str {
            &self.id
        }
    }

    #[test]
    fn test_subscribers_see_each_change() {
        let store: SliceStore<Row> = SliceStore::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(move |slice| {
            sink.lock().unwrap().push(slice.loading(Operation::Create));
        });

        let ticket = store.begin(Operation::Create);
        store.dispatch(Action::Fulfilled {
            ticket,
            outcome: Outcome::Created(Row { id: "r1".into() }),
        });

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
        assert_eq!(store.select(|s| s.items().len()), 1);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store: SliceStore<Row> = SliceStore::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let id = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        store.dispatch(Action::SelectAll);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.dispatch(Action::SelectAll);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_changes() {
        let store: SliceStore<Row> = SliceStore::default();
        let before = store.snapshot();
        store.dispatch(Action::Select("r1".into()));
        assert!(before.selected().is_empty());
        assert!(store.snapshot().is_selected("r1"));
    }

    #[test]
    fn test_listener_may_dispatch() {
        let store: Arc<SliceStore<Row>> = Arc::new(SliceStore::default());
        let inner = Arc::clone(&store);
        store.subscribe(move |slice| {
            if slice.error(Operation::Delete).is_some() {
                inner.dispatch(Action::ClearError(Operation::Delete));
            }
        });
        let ticket = store.begin(Operation::Delete);
        store.dispatch(Action::Rejected {
            ticket,
            message: Some("gone".into()),
        });
        assert_eq!(store.select(|s| s.error(Operation::Delete).map(String::from)), None);
    }
}
