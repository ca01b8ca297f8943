//! # SEO Console
//!
//! The state and data layer of an SEO console: keywords, content, site
//! audits, AI writing requests, rankings, and traffic reports, each held in
//! a resource slice and synchronized with a REST backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────┐   ┌──────────────┐
//! │  CLI (seoc)  │──▶│ Console            │──▶│ RestService  │──▶ backend
//! │  commands    │   │ controller/feature │   │ (reqwest)    │
//! └──────────────┘   └─────────┬──────────┘   └──────────────┘
//!                              │ subscribe
//!                              ▼
//!                        ┌──────────┐
//!                        │ Notifier │
//!                        └──────────┘
//! ```
//!
//! The slice state machine, store, and placeholder metrics live in the
//! `seo-console-core` crate.
//!
//! ## Quick Start
//!
//! ```bash
//! seoc list keywords --search shoes --sort-by position
//! seoc create audits --json '{"project_id": "p1", "url": "https://example.com"}'
//! seoc audit-scores
//! seoc metric 6f1c2a0e-audit
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Feature records and their create/update requests |
//! | [`http`] | REST collaborator |
//! | [`console`] | One controller per feature |
//! | [`notify`] | Transient failure notifications |
//! | [`commands`] | CLI command implementations |

pub mod commands;
pub mod config;
pub mod console;
pub mod http;
pub mod models;
pub mod notify;
