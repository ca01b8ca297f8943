//! Transient failure notifications.
//!
//! A [`Notifier`] subscribes to feature stores and turns every newly
//! failed attempt into one [`Notification`]. Re-renders of the same failed
//! state do not repeat it. Dismissing a notification clears the error on
//! its operation; notifications older than the configured TTL expire.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use seo_console_core::controller::ResourceController;
use seo_console_core::operation::{Operation, OperationStatus};
use seo_console_core::resource::Resource;

use crate::config::NotificationsConfig;
use crate::console::{Console, Feature};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub feature: Feature,
    pub operation: Operation,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Board {
    pending: Vec<Notification>,
    /// Last failed attempt already announced, per feature and operation.
    announced: HashMap<(Feature, Operation), u64>,
}

type ClearError = Box<dyn Fn(Operation) + Send + Sync>;
type Detach = Box<dyn FnOnce() + Send>;

pub struct Notifier {
    board: Arc<Mutex<Board>>,
    ttl: Duration,
    clearers: HashMap<Feature, ClearError>,
    detach: Vec<Detach>,
}

impl Notifier {
    pub fn new(config: &NotificationsConfig) -> Self {
        Self {
            board: Arc::new(Mutex::new(Board::default())),
            ttl: i64::try_from(config.ttl_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
            clearers: HashMap::new(),
            detach: Vec::new(),
        }
    }

    /// A notifier watching every feature of `console`.
    pub fn for_console(config: &NotificationsConfig, console: &Console) -> Self {
        let mut notifier = Self::new(config);
        notifier.watch(Feature::Keywords, &console.keywords);
        notifier.watch(Feature::Content, &console.content);
        notifier.watch(Feature::Audits, &console.audits);
        notifier.watch(Feature::AiRequests, &console.ai_requests);
        notifier.watch(Feature::Rankings, &console.rankings);
        notifier.watch(Feature::Traffic, &console.traffic);
        notifier
    }

    pub fn watch<T: Resource>(&mut self, feature: Feature, controller: &ResourceController<T>) {
        let board = Arc::clone(&self.board);
        let store = Arc::clone(controller.store());
        let subscription = store.subscribe(move |slice| {
            let mut board = board.lock().unwrap_or_else(PoisonError::into_inner);
            for (op, state) in slice.operations() {
                if state.status != OperationStatus::Failed {
                    continue;
                }
                let Some(ref message) = state.error else {
                    continue;
                };
                let key = (feature, op);
                if board.announced.get(&key) == Some(&state.attempt) {
                    continue;
                }
                board.announced.insert(key, state.attempt);
                debug!(feature = %feature, operation = %op, "notifying failure");
                board.pending.push(Notification {
                    id: Uuid::new_v4(),
                    feature,
                    operation: op,
                    message: message.clone(),
                    created_at: Utc::now(),
                });
            }
        });

        let ctl = controller.clone();
        self.clearers
            .insert(feature, Box::new(move |op| ctl.clear_error(op)));
        self.detach.push(Box::new(move || {
            store.unsubscribe(subscription);
        }));
    }

    /// Notifications not yet dismissed or expired, oldest first.
    pub fn pending(&self) -> Vec<Notification> {
        self.board
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .clone()
    }

    /// Remove a notification and clear the error it reported.
    ///
    /// Returns `false` if it was already gone.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let removed = {
            let mut board = self.board.lock().unwrap_or_else(PoisonError::into_inner);
            let index = board.pending.iter().position(|n| n.id == id);
            index.map(|i| board.pending.remove(i))
        };
        match removed {
            Some(n) => {
                if let Some(clear) = self.clearers.get(&n.feature) {
                    clear(n.operation);
                }
                true
            }
            None => false,
        }
    }

    /// Drop notifications older than the TTL as of `now`, returning them.
    pub fn expire(&self, now: DateTime<Utc>) -> Vec<Notification> {
        let mut board = self.board.lock().unwrap_or_else(PoisonError::into_inner);
        let ttl = self.ttl;
        let (expired, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut board.pending)
            .into_iter()
            .partition(|n| now - n.created_at >= ttl);
        board.pending = kept;
        expired
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        for detach in self.detach.drain(..) {
            detach();
        }
    }
}
