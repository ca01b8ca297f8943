//! # SEO Console Core
//!
//! Shared, transport-free logic for SEO Console: deterministic placeholder
//! metrics, the resource slice state machine, an explicitly injected store
//! with subscriptions, collaborator traits, and the controller that drives
//! asynchronous operations through them.
//!
//! This crate contains no tokio, HTTP client, or filesystem I/O. Concrete
//! REST collaborators live in the `seo-console` app crate.
//!
//! ```text
//! view ──▶ ResourceController ──▶ ResourceService (collaborator)
//!              │    ▲                     │
//!        begin │    │ Result              │ Ok / Err
//!              ▼    │                     ▼
//!          SliceStore ◀──── Fulfilled / Rejected
//!              │
//!              ▼
//!         subscribers
//! ```

pub mod controller;
pub mod metric;
pub mod operation;
pub mod resource;
pub mod service;
pub mod slice;
pub mod store;
