//! Resource records, request validation, filters, and pagination.
//!
//! Every feature area (keywords, content, audits, ...) is a collection of
//! records implementing [`Resource`]. Creating and updating go through typed
//! request structs ([`Resource::Draft`], [`Resource::Patch`]) that validate
//! themselves before anything is dispatched.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A record with a stable identifier, owned by one resource slice.
pub trait Resource: Clone + Send + Sync + 'static {
    /// Create request.
    type Draft: Validate + Serialize + Clone + Send + Sync + 'static;
    /// Partial update request.
    type Patch: Validate + Serialize + Clone + Send + Sync + 'static;

    /// Singular noun used in messages (e.g. `"keyword"`).
    const SINGULAR: &'static str;
    /// Plural noun used in messages (e.g. `"keywords"`).
    const PLURAL: &'static str;

    fn id(&self) -> &str;
}

/// Behavior needed to serve a resource from memory without a backend.
pub trait LocalResource: Resource {
    fn from_draft(id: String, draft: &Self::Draft) -> Self;

    fn apply_patch(&mut self, patch: &Self::Patch);

    /// Whether the record passes the current filter criteria.
    ///
    /// The default matches `search` against [`search_text`](LocalResource::search_text)
    /// case-insensitively and compares `status` / `category` exactly.
    fn matches(&self, filters: &Filters) -> bool {
        if let Some(ref needle) = filters.search {
            let needle = needle.to_lowercase();
            if !self.search_text().to_lowercase().contains(&needle) {
                return false;
            }
        }
        if let Some(ref status) = filters.status {
            if self.status() != Some(status.as_str()) {
                return false;
            }
        }
        if let Some(ref category) = filters.category {
            if self.category() != Some(category.as_str()) {
                return false;
            }
        }
        true
    }

    fn search_text(&self) -> String;

    fn status(&self) -> Option<&str> {
        None
    }

    fn category(&self) -> Option<&str> {
        None
    }

    /// Value used when sorting by `field`; `None` sorts last.
    fn sort_key(&self, field: &str) -> Option<SortKey>;
}

/// A comparable sort value.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum SortKey {
    Int(i64),
    Float(f64),
    Text(String),
}

impl SortKey {
    pub fn compare(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

/// Boundary validation failure for a typed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Typed requests check their own fields before dispatch.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Require a non-blank string of at most `max` characters.
pub fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max),
        ));
    }
    Ok(())
}

/// Require `value` to lie in `[min, max]`.
pub fn require_range<N>(field: &'static str, value: N, min: N, max: N) -> Result<(), ValidationError>
where
    N: PartialOrd + std::fmt::Display + Copy,
{
    if value < min || value > max {
        return Err(ValidationError::new(
            field,
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: '{}'", other)),
        }
    }
}

/// Current query criteria for a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

/// A partial change to [`Filters`].
///
/// `None` leaves a field alone; `Some("")` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl FilterPatch {
    pub fn is_empty(&self) -> bool {
        self == &FilterPatch::default()
    }
}

impl Filters {
    pub fn merge(&mut self, patch: FilterPatch) {
        fn set(slot: &mut Option<String>, value: Option<String>) {
            if let Some(v) = value {
                let v = v.trim().to_string();
                *slot = if v.is_empty() { None } else { Some(v) };
            }
        }
        set(&mut self.search, patch.search);
        set(&mut self.status, patch.status);
        set(&mut self.category, patch.category);
        set(&mut self.sort_by, patch.sort_by);
        if let Some(order) = patch.sort_order {
            self.sort_order = order;
        }
    }
}

/// Pagination metadata mirroring the last successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    /// 1-based.
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(limit: u32) -> Self {
        Self {
            total: 0,
            page: 1,
            limit: limit.max(1),
            total_pages: 0,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT)
    }
}

pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Number of pages needed for `total` records at `limit` per page.
pub fn page_count(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(limit));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(alias = "data")]
    pub items: Vec<T>,
    pub total: u64,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default, alias = "totalPages")]
    pub total_pages: Option<u32>,
}

fn default_page() -> u32 {
    1
}

impl<T> Page<T> {
    pub fn pagination(&self) -> Pagination {
        let limit = if self.limit == 0 {
            u32::try_from(self.items.len()).unwrap_or(u32::MAX).max(1)
        } else {
            self.limit
        };
        Pagination {
            total: self.total,
            page: self.page.max(1),
            limit,
            total_pages: self
                .total_pages
                .unwrap_or_else(|| page_count(self.total, limit)),
        }
    }
}

/// Parameters for a list fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub filters: Filters,
}

impl ListQuery {
    /// Flatten into `key=value` pairs for a transport, skipping unset filters.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        let f = &self.filters;
        if let Some(ref v) = f.search {
            pairs.push(("search", v.clone()));
        }
        if let Some(ref v) = f.status {
            pairs.push(("status", v.clone()));
        }
        if let Some(ref v) = f.category {
            pairs.push(("category", v.clone()));
        }
        if let Some(ref v) = f.sort_by {
            pairs.push(("sort_by", v.clone()));
            pairs.push(("sort_order", f.sort_order.as_str().to_string()));
        }
        pairs
    }
}
