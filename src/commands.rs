//! CLI command implementations.
//!
//! Each feature's controller is driven through [`FeatureCommands`], which
//! takes and returns JSON so one set of `run_*` functions serves every
//! feature. Results go to stdout; failures are returned to `main`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use seo_console_core::controller::ResourceController;
use seo_console_core::metric::derive_metric;
use seo_console_core::resource::{FilterPatch, Pagination, Resource, SortOrder};
use seo_console_core::slice::Action;

use crate::console::{Console, Feature};

/// Options for `seoc list`.
#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub items: serde_json::Value,
    pub pagination: Pagination,
}

/// JSON-in, JSON-out access to one feature's controller.
#[async_trait]
pub trait FeatureCommands: Send + Sync {
    async fn list_json(&self, args: ListArgs) -> Result<Listing>;

    async fn create_json(&self, json: &str) -> Result<serde_json::Value>;

    async fn update_json(&self, id: &str, json: &str) -> Result<serde_json::Value>;

    /// Deletes one id directly, or several with one bulk call.
    async fn delete_ids(&self, ids: Vec<String>) -> Result<usize>;
}

#[async_trait]
impl<T> FeatureCommands for ResourceController<T>
where
    T: Resource + Serialize,
    T::Draft: DeserializeOwned,
    T::Patch: DeserializeOwned,
{
    async fn list_json(&self, args: ListArgs) -> Result<Listing> {
        let store = self.store();
        if let Some(limit) = args.limit {
            store.dispatch(Action::SetLimit(limit));
        }
        store.dispatch(Action::SetFilters(FilterPatch {
            search: args.search,
            status: args.status,
            category: args.category,
            sort_by: args.sort_by,
            sort_order: args.order,
        }));
        store.dispatch(Action::SetPage(args.page.unwrap_or(1)));
        self.fetch_list().await?;

        let snapshot = self.snapshot();
        Ok(Listing {
            items: serde_json::to_value(snapshot.items())?,
            pagination: snapshot.pagination(),
        })
    }

    async fn create_json(&self, json: &str) -> Result<serde_json::Value> {
        let draft: T::Draft = serde_json::from_str(json)
            .with_context(|| format!("Invalid {} JSON", T::SINGULAR))?;
        let created = self.create(draft).await?;
        Ok(serde_json::to_value(created)?)
    }

    async fn update_json(&self, id: &str, json: &str) -> Result<serde_json::Value> {
        let patch: T::Patch = serde_json::from_str(json)
            .with_context(|| format!("Invalid {} update JSON", T::SINGULAR))?;
        let updated = self.update(id, patch).await?;
        Ok(serde_json::to_value(updated)?)
    }

    async fn delete_ids(&self, ids: Vec<String>) -> Result<usize> {
        let count = ids.len();
        match ids.as_slice() {
            [] => return Ok(0),
            [id] => self.delete(id).await?,
            _ => self.bulk_delete(ids).await?,
        }
        Ok(count)
    }
}

impl Console {
    pub fn feature(&self, feature: Feature) -> &dyn FeatureCommands {
        match feature {
            Feature::Keywords => &self.keywords,
            Feature::Content => &self.content,
            Feature::Audits => &self.audits,
            Feature::AiRequests => &self.ai_requests,
            Feature::Rankings => &self.rankings,
            Feature::Traffic => &self.traffic,
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run_list(console: &Console, feature: Feature, args: ListArgs) -> Result<()> {
    let listing = console.feature(feature).list_json(args).await?;
    let p = listing.pagination;
    println!(
        "--- {} (page {} of {}, {} total) ---",
        feature,
        p.page,
        p.total_pages.max(1),
        p.total
    );
    print_json(&listing.items)
}

pub async fn run_create(console: &Console, feature: Feature, json: &str) -> Result<()> {
    let created = console.feature(feature).create_json(json).await?;
    print_json(&created)
}

pub async fn run_update(console: &Console, feature: Feature, id: &str, json: &str) -> Result<()> {
    let updated = console.feature(feature).update_json(id, json).await?;
    print_json(&updated)
}

pub async fn run_delete(console: &Console, feature: Feature, ids: Vec<String>) -> Result<()> {
    let count = console.feature(feature).delete_ids(ids).await?;
    println!("Deleted {} {}.", count, feature);
    Ok(())
}

pub async fn run_rerun_audit(console: &Console, id: &str) -> Result<()> {
    let audit = console.rerun_audit(id).await?;
    println!("Audit {} queued (status: {}).", audit.id, audit.status);
    Ok(())
}

pub async fn run_retry_ai_request(console: &Console, id: &str) -> Result<()> {
    let request = console.retry_ai_request(id).await?;
    println!("AI request {} queued (status: {}).", request.id, request.status);
    Ok(())
}

/// Lists audits with the metric each one displays.
pub async fn run_audit_scores(console: &Console, args: ListArgs) -> Result<()> {
    console.feature(Feature::Audits).list_json(args).await?;
    let metrics = console.audit_metrics();
    if metrics.is_empty() {
        println!("No audits.");
        return Ok(());
    }
    println!(
        "{:<38} {:>5} {:>4} {:>6} {:>4}  source",
        "id", "score", "high", "medium", "low"
    );
    for (id, shown) in metrics {
        let issues = shown.metric.issue_breakdown;
        let source = serde_json::to_value(shown.source)?;
        println!(
            "{:<38} {:>5} {:>4} {:>6} {:>4}  {}",
            id,
            shown.metric.score,
            issues.high,
            issues.medium,
            issues.low,
            source.as_str().unwrap_or_default()
        );
    }
    Ok(())
}

/// Prints the placeholder metric for each identifier. Needs no backend.
pub fn run_metric(ids: &[String]) -> Result<()> {
    let rows: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "id": id,
                "metric": derive_metric(id),
            })
        })
        .collect();
    print_json(&rows)
}
