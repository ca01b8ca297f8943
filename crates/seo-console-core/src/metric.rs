//! Deterministic placeholder metrics.
//!
//! Audits and other records sometimes need a score to display before the
//! backend has produced one. Rather than re-randomizing on every render,
//! [`derive_metric`] folds the record identifier into a 32-bit rolling hash
//! and derives a bounded score and issue breakdown from it. The same
//! identifier always yields the same numbers, across calls and across
//! process restarts.
//!
//! These values are cosmetic. Different identifiers may collide, and a
//! placeholder must never replace an authoritative result once one exists
//! (see [`resolve_metric`]).
//!
//! # Example
//!
//! ```rust
//! use seo_console_core::metric::derive_metric;
//!
//! let m = derive_metric("abc");
//! assert_eq!(m.score, 54);
//! assert_eq!((m.issue_breakdown.high, m.issue_breakdown.medium, m.issue_breakdown.low), (4, 4, 5));
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Issue counts grouped by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueBreakdown {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl IssueBreakdown {
    pub fn total(&self) -> u32 {
        self.high + self.medium + self.low
    }
}

/// A score in `[0, 100)` plus an issue breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PseudoMetric {
    pub score: u32,
    pub issue_breakdown: IssueBreakdown,
}

/// Where a displayed metric came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSource {
    Authoritative,
    Placeholder,
}

/// A metric ready for display, tagged with its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayMetric {
    #[serde(flatten)]
    pub metric: PseudoMetric,
    pub source: MetricSource,
}

/// 32-bit rolling hash over the UTF-16 code units of `s`.
///
/// Each step computes `acc * 31 + unit` (written as `(acc << 5) - acc + unit`)
/// and wraps to a signed 32-bit integer.
pub fn rolling_hash(s: &str) -> i32 {
    s.encode_utf16().fold(0i32, |acc, unit| {
        (acc << 5).wrapping_sub(acc).wrapping_add(i32::from(unit))
    })
}

/// Derive the placeholder metric for an identifier.
///
/// Total over every string; the empty string yields the all-zero metric.
pub fn derive_metric(source_id: &str) -> PseudoMetric {
    metric_from_hash(rolling_hash(source_id))
}

/// Like [`derive_metric`], treating a missing identifier as empty.
pub fn derive_metric_opt(source_id: Option<&str>) -> PseudoMetric {
    derive_metric(source_id.unwrap_or(""))
}

fn metric_from_hash(hash: i32) -> PseudoMetric {
    // unsigned_abs keeps i32::MIN representable as 2^31
    let magnitude = hash.unsigned_abs();
    PseudoMetric {
        score: magnitude % 100,
        issue_breakdown: IssueBreakdown {
            high: magnitude % 5,
            medium: (magnitude >> 3) % 10,
            low: (magnitude >> 6) % 15,
        },
    }
}

/// Prefer an authoritative metric, falling back to the placeholder.
pub fn resolve_metric(authoritative: Option<PseudoMetric>, source_id: &str) -> DisplayMetric {
    match authoritative {
        Some(metric) => DisplayMetric {
            metric,
            source: MetricSource::Authoritative,
        },
        None => DisplayMetric {
            metric: derive_metric(source_id),
            source: MetricSource::Placeholder,
        },
    }
}

/// Per-pass memoization of derived metrics, keyed by identifier.
///
/// Purely an optimization: a cache miss recomputes the same value.
#[derive(Debug, Default)]
pub struct MetricCache {
    entries: HashMap<String, PseudoMetric>,
}

impl MetricCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_derive(&mut self, source_id: &str) -> PseudoMetric {
        if let Some(metric) = self.entries.get(source_id) {
            return *metric;
        }
        let metric = derive_metric(source_id);
        self.entries.insert(source_id.to_string(), metric);
        metric
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all memoized entries, typically at the start of a new pass.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
